//! Error types for the asset cache.

use thiserror::Error;

/// Errors that can occur while caching or fetching assets.
#[derive(Error, Debug)]
pub enum CacheError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Remote returned a non-success status
    #[error("Unexpected status {status} for {url}")]
    Status { status: u16, url: String },

    /// No cache storage is available in this environment
    #[error("Offline cache storage is not available")]
    Unsupported,

    /// Bulk run requested before the catalog was loaded
    #[error("Catalog is empty, nothing to cache")]
    EmptyCatalog,

    /// Another bulk run is active
    #[error("A caching run is already in progress")]
    AlreadyRunning,

    /// URL cannot be parsed or routed
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Asset is neither reachable nor cached
    #[error("Asset unavailable offline: {0}")]
    Unavailable(String),

    /// IO error in a disk-backed store
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CacheError {
    pub fn status(status: reqwest::StatusCode, url: impl Into<String>) -> Self {
        Self::Status {
            status: status.as_u16(),
            url: url.into(),
        }
    }
}

/// Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
