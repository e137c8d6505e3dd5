use async_trait::async_trait;
use futures::future::join_all;
use ns_core::{
    AggregationRequest, Article, ArticleStorage, Category, LocationContext, NewsFeed, Preferences, Result,
};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::sources::{ArticleSource, NewsApiSource, StoreSource};

pub const DEFAULT_TRENDING_LIMIT: usize = 10;

/// Fans a request out to every source and merges the results into one feed.
pub struct NewsAggregator {
    // precedence order: earlier sources win title collisions
    sources: Vec<Arc<dyn ArticleSource>>,
}

impl NewsAggregator {
    pub fn new(store: Arc<dyn ArticleSource>, external: Arc<dyn ArticleSource>) -> Self {
        Self::with_sources(vec![store, external])
    }

    pub fn with_sources(sources: Vec<Arc<dyn ArticleSource>>) -> Self {
        Self { sources }
    }

    pub fn from_config(storage: Arc<dyn ArticleStorage>, config: &Config) -> Self {
        Self::new(
            Arc::new(StoreSource::new(storage)),
            Arc::new(NewsApiSource::from_config(config)),
        )
    }

    pub async fn get_news(&self, request: &AggregationRequest) -> Result<Vec<Article>> {
        request.validate()?;
        info!(
            "📰 Fetching news (category: {:?}, trending: {}, location: {})",
            request.category,
            request.trending,
            request
                .location
                .as_ref()
                .map_or("global", |l| if l.formatted.is_empty() { "unnamed" } else { l.formatted.as_str() })
        );

        let fetches = self.sources.iter().map(|source| async move {
            match source.fetch_articles(request).await {
                Ok(articles) => {
                    debug!("{} returned {} articles", source.name(), articles.len());
                    articles
                }
                Err(e) => {
                    warn!("⚠️ Source {} failed: {}", source.name(), e);
                    Vec::new()
                }
            }
        });
        let batches = join_all(fetches).await;

        let articles = merge_articles(batches, request.page_size);
        info!("✨ Returning {} articles", articles.len());
        Ok(articles)
    }

    /// Search every source. A blank term falls back to the global feed.
    pub async fn search_news(&self, term: &str, request: &AggregationRequest) -> Result<Vec<Article>> {
        let term = term.trim();
        if term.is_empty() {
            return self.get_news(&AggregationRequest::global(request.page_size)).await;
        }
        info!("🔍 Searching news for '{}'", term);
        let request = request.clone().with_search_term(term);
        self.get_news(&request).await
    }

    pub async fn fetch_global_news(&self, limit: usize) -> Result<Vec<Article>> {
        self.get_news(&AggregationRequest::global(limit)).await
    }

    /// Local feed for a location, narrowed to the first preferred category.
    pub async fn fetch_location_news(
        &self,
        location: LocationContext,
        preferences: &Preferences,
        limit: usize,
    ) -> Result<Vec<Article>> {
        let request = AggregationRequest::global(limit)
            .with_location(Some(location))
            .with_category(preferences.primary_category());
        self.get_news(&request).await
    }

    pub async fn fetch_trending_news(&self, limit: Option<usize>) -> Result<Vec<Article>> {
        let request = AggregationRequest::global(limit.unwrap_or(DEFAULT_TRENDING_LIMIT)).trending(true);
        self.get_news(&request).await
    }

    pub async fn fetch_news_by_category(&self, category: Category, limit: usize) -> Result<Vec<Article>> {
        let request = AggregationRequest::global(limit).with_category(Some(category));
        self.get_news(&request).await
    }
}

#[async_trait]
impl NewsFeed for NewsAggregator {
    async fn get_news(&self, request: &AggregationRequest) -> Result<Vec<Article>> {
        NewsAggregator::get_news(self, request).await
    }

    async fn search_news(&self, term: &str, request: &AggregationRequest) -> Result<Vec<Article>> {
        NewsAggregator::search_news(self, term, request).await
    }
}

/// Concatenate batches in precedence order, drop unshowable articles, keep
/// the first article per normalized title, order newest first and truncate.
pub fn merge_articles(batches: Vec<Vec<Article>>, page_size: usize) -> Vec<Article> {
    let combined: Vec<Article> = batches.into_iter().flatten().filter(Article::is_valid).collect();
    let mut articles = remove_duplicates(combined);
    // sort_by is stable, so equal timestamps keep precedence order
    articles.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    articles.truncate(page_size);
    articles
}

/// Keep the first article per normalized title. Titles that normalize to
/// nothing cannot be compared and are dropped.
pub fn remove_duplicates(articles: Vec<Article>) -> Vec<Article> {
    let mut seen = HashSet::new();
    articles
        .into_iter()
        .filter(|a| {
            let key = a.normalized_title();
            !key.is_empty() && seen.insert(key)
        })
        .collect()
}
