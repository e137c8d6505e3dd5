use async_trait::async_trait;

use crate::category::Category;
use crate::types::{Article, Comment};
use crate::Result;

/// Equality filter supported by the document store.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreFilter {
    Category(Category),
    Country(String),
}

/// Numeric article fields the store can increment atomically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    Views,
    Likes,
    Comments,
}

/// A collection query. Results are always ordered by publish time, most
/// recent first.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreQuery {
    pub filter: Option<StoreFilter>,
    pub limit: usize,
}

impl StoreQuery {
    pub fn recent(limit: usize) -> Self {
        Self { filter: None, limit }
    }

    pub fn filtered(filter: StoreFilter, limit: usize) -> Self {
        Self {
            filter: Some(filter),
            limit,
        }
    }
}

#[async_trait]
pub trait ArticleStorage: Send + Sync {
    /// Run a filtered, time-ordered, limited query over the news collection
    async fn query(&self, query: &StoreQuery) -> Result<Vec<Article>>;

    async fn get_article(&self, id: &str) -> Result<Option<Article>>;

    /// Insert a new document and return its generated key
    async fn add_article(&self, article: &Article) -> Result<String>;

    /// Atomically add `delta` to a counter, clamping at zero. Returns the new value.
    async fn increment(&self, id: &str, counter: Counter, delta: i64) -> Result<u64>;

    async fn has_like(&self, id: &str, user_id: &str) -> Result<bool>;

    /// Flip the user's like and adjust the like counter in one step.
    /// Returns whether the article is now liked.
    async fn toggle_like(&self, id: &str, user_id: &str) -> Result<bool>;

    /// Store a comment under the article; the returned comment carries its key
    async fn add_comment(&self, id: &str, comment: &Comment) -> Result<Comment>;

    /// Comments, newest first
    async fn get_comments(&self, id: &str, limit: usize) -> Result<Vec<Comment>>;
}
