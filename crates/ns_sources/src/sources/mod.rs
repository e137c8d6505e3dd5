use async_trait::async_trait;
use ns_core::{AggregationRequest, Article, ArticleOrigin, Result};

pub mod newsapi;
pub mod store;

pub use newsapi::NewsApiSource;
pub use store::StoreSource;

/// One article provider. Implementations translate their native schema into
/// the canonical [`Article`] and are expected to degrade to an empty list when
/// their backend is unreachable; an `Err` is still tolerated by the pipeline.
#[async_trait]
pub trait ArticleSource: Send + Sync {
    /// Returns the name of the provider, used in logs
    fn name(&self) -> &str;

    /// Provenance tag stamped on every article this source produces
    fn origin(&self) -> ArticleOrigin;

    async fn fetch_articles(&self, request: &AggregationRequest) -> Result<Vec<Article>>;
}
