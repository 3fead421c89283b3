/// Player error types
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PlayerError>;

#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Feed {source_ref} unavailable: {reason}")]
    Feed { source_ref: String, reason: String },

    #[error("Track not found: {0}")]
    TrackNotFound(sekai_core::TrackId),

    #[error(transparent)]
    Core(#[from] sekai_core::CoreError),

    #[error(transparent)]
    Storage(#[from] sekai_storage::StorageError),

    #[error(transparent)]
    Playback(#[from] sekai_playback::PlaybackError),

    #[error(transparent)]
    Cache(#[from] sekai_cache::CacheError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl PlayerError {
    pub fn feed(source_ref: impl Into<String>, reason: impl ToString) -> Self {
        Self::Feed {
            source_ref: source_ref.into(),
            reason: reason.to_string(),
        }
    }
}
