/// Core error types for the SEKAI player
use thiserror::Error;

use crate::types::TrackId;

/// Result type alias using `CoreError`
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core error type for the SEKAI player
#[derive(Error, Debug)]
pub enum CoreError {
    /// Entity not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Track not found in the catalog
    #[error("Track not found: {0}")]
    TrackNotFound(TrackId),

    /// Track has no vocal variants to play
    #[error("Track {0} has no vocal variants")]
    NoVocals(TrackId),

    /// Vocal variant does not belong to the given track
    #[error("Vocal variant {asset} does not belong to track {track}")]
    VocalMismatch { track: TrackId, asset: String },

    /// Catalog feed could not be parsed
    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl CoreError {
    /// Create a not found error
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Create an invalid catalog error
    pub fn invalid_catalog(msg: impl Into<String>) -> Self {
        Self::InvalidCatalog(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}
