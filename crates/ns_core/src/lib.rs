pub mod category;
pub mod error;
pub mod feed;
pub mod location;
pub mod request;
pub mod storage;
pub mod types;

pub use category::{infer_category, Category};
pub use error::{Error, LocationError, Result};
pub use feed::NewsFeed;
pub use location::{LocationContext, LocationPreference, Locator, Preferences};
pub use request::{AggregationRequest, DEFAULT_PAGE_SIZE};
pub use storage::{ArticleStorage, Counter, StoreFilter, StoreQuery};
pub use types::{external_id, normalize_title, Article, ArticleLocation, ArticleOrigin, Comment, SourceRef};
