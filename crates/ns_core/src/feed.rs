use async_trait::async_trait;

use crate::request::AggregationRequest;
use crate::types::Article;
use crate::Result;

/// Seam between the session store and the aggregation pipeline.
#[async_trait]
pub trait NewsFeed: Send + Sync {
    async fn get_news(&self, request: &AggregationRequest) -> Result<Vec<Article>>;

    async fn search_news(&self, term: &str, request: &AggregationRequest) -> Result<Vec<Article>>;
}
