//! Article sources and the aggregation pipeline that merges them into one feed.

pub mod aggregator;
pub mod cli;
pub mod config;
pub mod engagement;
pub mod logging;
pub mod sources;

pub use aggregator::{merge_articles, remove_duplicates, NewsAggregator};
pub use cli::{handle_command, NewsCommands};
pub use config::Config;
pub use engagement::ArticleService;
pub use logging::init_logging;
pub use sources::{ArticleSource, NewsApiSource, StoreSource};

pub mod prelude {
    pub use super::sources::ArticleSource;
    pub use super::{ArticleService, Config, NewsAggregator};
    pub use ns_core::{AggregationRequest, Article, Error, Result};
}
