use async_trait::async_trait;
use ns_core::{AggregationRequest, Article, ArticleOrigin, ArticleStorage, Result, StoreFilter, StoreQuery};
use std::sync::Arc;
use tracing::{debug, warn};

use super::ArticleSource;

/// Adapter over the first-party document store.
pub struct StoreSource {
    storage: Arc<dyn ArticleStorage>,
}

impl StoreSource {
    pub fn new(storage: Arc<dyn ArticleStorage>) -> Self {
        Self { storage }
    }

    /// Query used outside search mode. Trending wins over category, which
    /// wins over the location's country.
    pub fn build_query(request: &AggregationRequest) -> StoreQuery {
        let filter = if request.trending {
            None
        } else if let Some(category) = request.category {
            Some(StoreFilter::Category(category))
        } else {
            request
                .location
                .as_ref()
                .and_then(|l| l.filter_country())
                .map(|country| StoreFilter::Country(country.to_string()))
        };

        StoreQuery {
            filter,
            limit: request.page_size,
        }
    }

    pub async fn try_fetch(&self, request: &AggregationRequest) -> Result<Vec<Article>> {
        let mut articles = match request.search_term() {
            Some(term) => self.search(term, request.page_size).await?,
            None => self.storage.query(&Self::build_query(request)).await?,
        };
        for article in &mut articles {
            article.origin = ArticleOrigin::Store;
        }
        Ok(articles)
    }

    /// The store has no text index: over-fetch recent documents and match
    /// client side.
    async fn search(&self, term: &str, page_size: usize) -> Result<Vec<Article>> {
        let needle = term.to_lowercase();
        let recent = self
            .storage
            .query(&StoreQuery::recent(page_size.saturating_mul(2)))
            .await?;
        let matches: Vec<Article> = recent
            .into_iter()
            .filter(|a| a.mentions(&needle))
            .take(page_size)
            .collect();
        debug!("Store search for '{}' matched {} articles", term, matches.len());
        Ok(matches)
    }
}

#[async_trait]
impl ArticleSource for StoreSource {
    fn name(&self) -> &str {
        "store"
    }

    fn origin(&self) -> ArticleOrigin {
        ArticleOrigin::Store
    }

    async fn fetch_articles(&self, request: &AggregationRequest) -> Result<Vec<Article>> {
        match self.try_fetch(request).await {
            Ok(articles) => Ok(articles),
            Err(e) => {
                warn!("Error fetching from store: {}", e);
                Ok(Vec::new())
            }
        }
    }
}
