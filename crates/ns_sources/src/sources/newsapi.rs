use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ns_core::{
    external_id, infer_category, AggregationRequest, Article, ArticleLocation, ArticleOrigin, Error, Result,
    SourceRef,
};
use reqwest::Client;
use serde::Deserialize;
use std::fmt;
use tracing::{debug, info, warn};
use url::Url;

use super::ArticleSource;
use crate::config::Config;

const MAX_PAGE_SIZE: usize = 100;
const REMOVED_MARKER: &str = "[Removed]";

#[derive(Debug, Deserialize)]
struct NewsApiResponse {
    status: String,
    #[serde(default)]
    articles: Vec<NewsApiArticle>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewsApiArticle {
    #[serde(default)]
    source: NewsApiSourceRef,
    title: Option<String>,
    description: Option<String>,
    content: Option<String>,
    url: Option<String>,
    url_to_image: Option<String>,
    published_at: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct NewsApiSourceRef {
    name: Option<String>,
    url: Option<String>,
}

/// Adapter over a NewsAPI style HTTP API.
pub struct NewsApiSource {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl NewsApiSource {
    pub fn new(api_key: Option<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.filter(|k| !k.is_empty()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.news_api_key.clone(), config.news_api_url.clone())
    }

    /// Map a request to the upstream endpoint and query parameters.
    pub fn build_url(&self, request: &AggregationRequest) -> Result<Url> {
        let endpoint = if request.trending { "top-headlines" } else { "everything" };
        let mut params: Vec<(&str, String)> = vec![
            ("pageSize", request.page_size.min(MAX_PAGE_SIZE).to_string()),
            ("sortBy", if request.trending { "popularity" } else { "publishedAt" }.to_string()),
        ];

        if let Some(term) = request.search_term() {
            params.push(("q", term.to_string()));
        }

        if request.trending {
            if let Some(category) = request.category {
                params.push(("category", category.to_string()));
            }
        }

        match request.location.as_ref().and_then(|l| l.country_code()) {
            Some(code) => params.push(("country", code.to_lowercase())),
            None if request.location.is_none() && request.trending => {
                params.push(("language", "en".to_string()));
            }
            None => {}
        }

        // the upstream rejects unconstrained "everything" queries
        if !request.trending && request.search_term().is_none() {
            let q = request.category.map_or("news".to_string(), |c| c.to_string());
            params.push(("q", q));
            params.push(("language", "en".to_string()));
        }

        Ok(Url::parse_with_params(&format!("{}/{}", self.base_url, endpoint), &params)?)
    }

    pub async fn try_fetch(&self, request: &AggregationRequest) -> Result<Vec<Article>> {
        let Some(api_key) = self.api_key.as_deref() else {
            warn!("No external API key found, skipping external news fetch");
            return Ok(Vec::new());
        };

        let url = self.build_url(request)?;
        info!("Fetching from external API: {}", url);

        let response = self.client.get(url).header("X-Api-Key", api_key).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<NewsApiResponse>()
                .await
                .ok()
                .and_then(|body| body.message)
                .unwrap_or_else(|| "Unknown error".to_string());
            return Err(Error::unavailable(self.name(), format!("API error: {} - {}", status, message)));
        }

        let body: NewsApiResponse = response.json().await?;
        if body.status != "ok" {
            return Err(Error::unavailable(
                self.name(),
                format!("API error: {}", body.message.unwrap_or_else(|| "Unknown error".to_string())),
            ));
        }

        let articles: Vec<Article> = body
            .articles
            .into_iter()
            .filter_map(|raw| normalize(raw, request))
            .collect();
        debug!("External API returned {} usable articles", articles.len());
        Ok(articles)
    }
}

/// Translate one upstream record, dropping it when it lacks a title or
/// description, was redacted upstream, or has no usable URL or timestamp.
fn normalize(raw: NewsApiArticle, request: &AggregationRequest) -> Option<Article> {
    let title = raw.title.filter(|t| !t.trim().is_empty() && t != REMOVED_MARKER)?;
    let description = raw.description.filter(|d| !d.trim().is_empty())?;
    let url = raw.url.filter(|u| !u.is_empty())?;
    let published_at = raw
        .published_at
        .as_deref()
        .and_then(|p| DateTime::parse_from_rfc3339(p).ok())?
        .with_timezone(&Utc);

    let category = request
        .category
        .unwrap_or_else(|| infer_category(&title, &description));

    Some(Article {
        id: external_id(&url),
        source: SourceRef {
            name: raw.source.name.unwrap_or_else(|| "Unknown".to_string()),
            url: raw.source.url.or_else(|| Some(url.clone())),
        },
        title,
        description,
        content: raw.content.unwrap_or_default(),
        image_url: raw.url_to_image,
        published_at,
        url: Some(url),
        category,
        location: request.location.as_ref().map(ArticleLocation::from),
        views: 0,
        likes: 0,
        comments: 0,
        origin: ArticleOrigin::External,
    })
}

impl fmt::Debug for NewsApiSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewsApiSource")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl ArticleSource for NewsApiSource {
    fn name(&self) -> &str {
        "newsapi"
    }

    fn origin(&self) -> ArticleOrigin {
        ArticleOrigin::External
    }

    async fn fetch_articles(&self, request: &AggregationRequest) -> Result<Vec<Article>> {
        match self.try_fetch(request).await {
            Ok(articles) => Ok(articles),
            Err(e) => {
                warn!("Error fetching from external API: {}", e);
                Ok(Vec::new())
            }
        }
    }
}
