//! Playback Events
//!
//! Event-based communication for UI synchronization. The controller queues
//! events as it changes state and the host drains them with
//! [`crate::PlaybackController::drain_events`].

use std::time::Duration;

use sekai_core::{AssetUrls, Track, TrackId, VocalVariant};
use serde::{Deserialize, Serialize};

use crate::types::{HandleId, PlayerState};
use crate::volume::VolumeIndicator;

/// Events emitted by the playback controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlayerEvent {
    /// Controller state changed
    StateChanged {
        /// The new state
        state: PlayerState,
    },

    /// A new track became current (emitted before its playback starts)
    TrackChanged(NowPlaying),

    /// Metadata for the OS now-playing surface
    MediaMetadata(MediaMetadata),

    /// Displayed position of the active handle
    Progress {
        position: Duration,
        duration: Duration,
        /// 0-100
        percent: f64,
    },

    /// Position shown while a seek drag is in progress (no handle moved)
    SeekPreview { position: Duration, percent: f64 },

    /// Buffered range of the active handle, 0-100
    Buffered { percent: f64 },

    /// Loading indicator
    Buffering { active: bool },

    /// Volume or mute changed
    VolumeChanged {
        /// 0.0 - 1.0
        level: f32,
        muted: bool,
        indicator: VolumeIndicator,
    },

    RepeatChanged { enabled: bool },

    ShuffleChanged { enabled: bool },

    /// A crossfade ramp began
    CrossfadeStarted {
        from: HandleId,
        to: HandleId,
        duration: Duration,
    },

    /// Crossfade step applied
    CrossfadeProgress {
        /// Progress from 0.0 (just started) to 1.0 (complete)
        progress: f32,
    },

    /// Crossfade finished or was superseded
    CrossfadeCompleted,

    /// Playback of this track started; count it as a play
    PlayRecorded { track_id: TrackId },

    /// A playback start was rejected; the player is paused but loaded
    PlaybackFailed { reason: String },

    /// The user asked for the lyrics of the current track
    LyricsRequested { track_id: TrackId },

    /// Media error reported by a handle
    Error {
        /// Error message
        message: String,
    },
}

/// Snapshot of the current track for the now-playing bar and catalog cards
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NowPlaying {
    pub track_id: TrackId,
    pub title: String,
    pub artist: String,
    /// Primary unit, drives the accent theme
    pub unit: String,
    pub jacket_url: String,
    pub vocal_asset: String,
    pub audio_url: String,
}

impl NowPlaying {
    pub fn new(track: &Track, vocal: &VocalVariant, urls: &AssetUrls) -> Self {
        Self {
            track_id: track.id,
            title: track.title.clone(),
            artist: track.artist_line(vocal),
            unit: track.primary_unit().to_string(),
            jacket_url: urls.track_jacket(track),
            vocal_asset: vocal.asset.clone(),
            audio_url: urls.vocal_audio(vocal),
        }
    }
}

/// OS media-session metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaMetadata {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub artwork: Vec<Artwork>,
}

/// Media-session artwork entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artwork {
    pub src: String,
    pub sizes: String,
    #[serde(rename = "type")]
    pub mime_type: String,
}

impl MediaMetadata {
    pub fn new(now_playing: &NowPlaying, album: &str) -> Self {
        Self {
            title: now_playing.title.clone(),
            artist: now_playing.artist.clone(),
            album: album.to_string(),
            artwork: vec![Artwork {
                src: now_playing.jacket_url.clone(),
                sizes: "512x512".to_string(),
                mime_type: "image/png".to_string(),
            }],
        }
    }
}
