use ns_core::{ArticleStorage, Error, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

pub mod backends;

pub use backends::*;

/// Build the storage backend named on the command line, optionally seeded
/// from a JSON file of articles.
pub async fn create_storage(kind: &str, seed: Option<&Path>) -> Result<Arc<dyn ArticleStorage>> {
    match kind {
        "memory" => {
            let storage = match seed {
                Some(path) => MemoryStorage::from_json_file(path).await?,
                None => MemoryStorage::new(),
            };
            info!("🏦 Memory storage ready with {} articles", storage.len().await);
            Ok(Arc::new(storage))
        }
        other => Err(Error::Storage(format!("Unknown storage backend: {}", other))),
    }
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::create_storage;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_storage_rejects_unknown_backend() {
        assert!(create_storage("qdrant", None).await.is_err());
        assert!(create_storage("memory", None).await.is_ok());
    }
}
