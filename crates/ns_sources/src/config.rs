use ns_core::DEFAULT_PAGE_SIZE;
use ns_location::GeocodingConfig;
use std::env;
use std::fmt;

pub const NEWS_API_URL: &str = "https://newsapi.org/v2";

/// Runtime settings for the adapters and the location resolver.
#[derive(Clone)]
pub struct Config {
    pub news_api_key: Option<String>,
    pub news_api_url: String,
    pub geocoding: GeocodingConfig,
    pub page_size: usize,
}

impl Config {
    /// Read settings from the environment, falling back to the public endpoints.
    pub fn from_env() -> Self {
        Self {
            news_api_key: env::var("NEWS_API_KEY").ok().filter(|k| !k.is_empty()),
            news_api_url: env::var("NEWS_API_URL").unwrap_or_else(|_| NEWS_API_URL.to_string()),
            geocoding: GeocodingConfig::from_env(),
            page_size: env::var("NEWS_PAGE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(DEFAULT_PAGE_SIZE),
        }
    }

    /// Override the default page size; zero is ignored.
    pub fn with_page_size(mut self, page_size: Option<usize>) -> Self {
        if let Some(page_size) = page_size.filter(|n| *n > 0) {
            self.page_size = page_size;
        }
        self
    }

    pub fn with_news_api_key(mut self, key: Option<String>) -> Self {
        if let Some(key) = key.filter(|k| !k.is_empty()) {
            self.news_api_key = Some(key);
        }
        self
    }

    pub fn with_geocoding_key(mut self, key: Option<String>) -> Self {
        if let Some(key) = key.filter(|k| !k.is_empty()) {
            self.geocoding.forward_api_key = Some(key);
        }
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            news_api_key: None,
            news_api_url: NEWS_API_URL.to_string(),
            geocoding: GeocodingConfig::default(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("news_api_key", &self.news_api_key.as_ref().map(|_| "<redacted>"))
            .field("news_api_url", &self.news_api_url)
            .field("geocoding", &self.geocoding)
            .field("page_size", &self.page_size)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_hides_keys() {
        let config = Config::default()
            .with_news_api_key(Some("super-secret".to_string()))
            .with_geocoding_key(Some("geo-secret".to_string()));
        let printed = format!("{:?}", config);
        assert!(!printed.contains("super-secret"));
        assert!(!printed.contains("geo-secret"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn test_empty_override_keeps_existing_key() {
        let config = Config::default()
            .with_news_api_key(Some("k".to_string()))
            .with_news_api_key(Some(String::new()));
        assert_eq!(config.news_api_key.as_deref(), Some("k"));
    }

    #[test]
    fn test_page_size_override() {
        assert_eq!(Config::default().page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(Config::default().with_page_size(Some(0)).page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(Config::default().with_page_size(Some(7)).page_size, 7);
        assert_eq!(Config::default().with_page_size(None).page_size, DEFAULT_PAGE_SIZE);
    }
}
