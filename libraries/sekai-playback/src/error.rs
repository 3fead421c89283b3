//! Error types for playback control

use sekai_core::TrackId;
use thiserror::Error;

/// Playback errors
///
/// A rejected playback start is not an error: it is reported through
/// [`crate::PlayerEvent::PlaybackFailed`] and leaves the player paused.
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// No track is currently loaded
    #[error("No track loaded")]
    NoTrackLoaded,

    /// Session playlist is empty
    #[error("Playlist is empty")]
    PlaylistEmpty,

    /// Active handle has not reported a duration yet
    #[error("Track duration not known yet")]
    DurationUnknown,

    /// Track has no vocal variants
    #[error("Track {0} has no vocal variants")]
    NoVocals(TrackId),

    /// Variant does not belong to the track
    #[error("Vocal {asset} does not belong to track {track}")]
    VocalMismatch { track: TrackId, asset: String },
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
