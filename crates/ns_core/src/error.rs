use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Source {adapter} unavailable: {reason}")]
    AdapterUnavailable { adapter: String, reason: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Location error: {0}")]
    Location(#[from] LocationError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("External error: {0}")]
    External(#[from] anyhow::Error),
}

impl Error {
    pub fn unavailable(adapter: impl Into<String>, reason: impl ToString) -> Self {
        Self::AdapterUnavailable {
            adapter: adapter.into(),
            reason: reason.to_string(),
        }
    }
}

/// Failures of the location resolver. None of these are fatal for the news
/// feed: callers downgrade them to "no location" unless the action's whole
/// purpose was resolving a location.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,

    #[error("Location not found: {0}")]
    NotFound(String),

    #[error("Location request timed out")]
    Timeout,

    #[error("Geolocation is not supported on this platform")]
    Unsupported,

    #[error("Geocoding failed: {0}")]
    Geocoding(String),
}

impl From<reqwest::Error> for LocationError {
    fn from(e: reqwest::Error) -> Self {
        Self::Geocoding(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
