use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::category::Category;
use crate::location::LocationContext;

/// Which adapter produced an article. Only external articles may be written
/// back into the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleOrigin {
    #[default]
    Store,
    External,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRef {
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
}

impl Default for SourceRef {
    fn default() -> Self {
        Self {
            name: "Unknown".to_string(),
            url: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ArticleLocation {
    pub city: String,
    pub state: String,
    pub country: String,
    pub country_code: String,
    pub formatted: String,
}

impl From<&LocationContext> for ArticleLocation {
    fn from(location: &LocationContext) -> Self {
        Self {
            city: location.city.clone(),
            state: location.state.clone(),
            country: location.country.clone(),
            country_code: location.country_code.clone(),
            formatted: location.formatted.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub image_url: Option<String>,
    pub published_at: DateTime<Utc>,
    #[serde(default)]
    pub source: SourceRef,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub location: Option<ArticleLocation>,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub comments: u64,
    #[serde(default)]
    pub origin: ArticleOrigin,
}

impl Article {
    /// An article needs both a title and a description to be shown.
    pub fn is_valid(&self) -> bool {
        !self.title.trim().is_empty() && !self.description.trim().is_empty()
    }

    pub fn normalized_title(&self) -> String {
        normalize_title(&self.title)
    }

    /// Case-insensitive substring match over title, description and content.
    /// `needle` must already be lowercase.
    pub fn mentions(&self, needle: &str) -> bool {
        [&self.title, &self.description, &self.content]
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }

    pub fn is_external(&self) -> bool {
        self.origin == ArticleOrigin::External
    }
}

/// Lowercase, drop everything that is neither a word character nor
/// whitespace, then trim.
pub fn normalize_title(title: &str) -> String {
    title
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect::<String>()
        .trim()
        .to_string()
}

/// Stable identifier for an externally sourced article.
pub fn external_id(url: &str) -> String {
    let digest = format!("{:x}", Sha256::digest(url.as_bytes()));
    digest[..20].to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub user_id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub likes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_title() {
        assert_eq!(normalize_title("  Breaking: Markets, Up!  "), "breaking markets up");
        assert_eq!(normalize_title("X"), normalize_title("x"));
        assert_eq!(normalize_title("?!"), "");
    }

    #[test]
    fn test_external_id_is_deterministic() {
        let a = external_id("https://example.com/story");
        assert_eq!(a, external_id("https://example.com/story"));
        assert_eq!(a.len(), 20);
        assert_ne!(a, external_id("https://example.com/other"));
    }

    #[test]
    fn test_article_defaults_from_json() {
        let article: Article = serde_json::from_str(
            r#"{"id":"abc","title":"T","description":"D","publishedAt":"2024-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(article.views, 0);
        assert_eq!(article.category, Category::General);
        assert_eq!(article.origin, ArticleOrigin::Store);
        assert!(article.is_valid());
        assert!(article.location.is_none());
    }
}
