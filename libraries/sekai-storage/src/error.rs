/// Storage-specific errors
use thiserror::Error;

/// Result type alias using `StorageError`
pub type Result<T> = std::result::Result<T, StorageError>;

/// Storage error types
#[derive(Error, Debug)]
pub enum StorageError {
    /// Backend failed to read or write a key
    #[error("Storage backend error: {0}")]
    Backend(String),

    /// Key cannot be used by the backend
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    /// Entity not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Saved playlist cap reached
    #[error("Playlist limit reached (max {max})")]
    PlaylistLimit { max: usize },

    /// Serialization/deserialization error
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StorageError {
    /// Create a not found error
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Create a backend error
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}
