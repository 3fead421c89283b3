//! Core types for playback control

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One of the two output handles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleId {
    A,
    B,
}

impl HandleId {
    /// The handle that is not `self`
    pub fn other(self) -> Self {
        match self {
            HandleId::A => HandleId::B,
            HandleId::B => HandleId::A,
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            HandleId::A => 0,
            HandleId::B => 1,
        }
    }
}

/// Controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerState {
    /// Nothing loaded
    Idle,

    /// Source assigned, waiting for playback to start
    Loading,

    /// Currently playing
    Playing,

    /// Paused mid-track (or a start was rejected)
    Paused,

    /// Crossfade in progress
    Transitioning,
}

/// Identifies one playback start request on a sink
///
/// Tickets increase monotonically per controller. A start outcome carrying
/// a ticket that is no longer awaited is stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayTicket(pub u64);

/// Identifies a recurring timer handed out by a [`crate::Scheduler`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerId(pub u64);

/// Configuration for the playback controller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Leading region of every asset that is never audible (default: 9s)
    pub intro_skip: Duration,

    /// Discrete gain steps of a crossfade ramp (default: 20)
    pub crossfade_steps: u32,

    /// Past `intro_skip + restart_threshold`, previous restarts the track (default: 3s)
    pub restart_threshold: Duration,

    /// Playlist entries prefetched when a track starts, current included (default: 10)
    pub preload_count: usize,

    /// Lower bound of the auto-crossfade window (default: 50ms)
    pub auto_crossfade_epsilon: Duration,

    /// Tolerance before the intro skip is re-applied on start (default: 500ms)
    pub seek_tolerance: Duration,

    /// Album reported to the media session (default: "Project SEKAI")
    pub media_album: String,

    /// Relative seek step for keyboard control (default: 5s)
    pub key_seek_step: Duration,

    /// Volume step for keyboard control, in percent (default: 10)
    pub key_volume_step: u8,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            intro_skip: Duration::from_secs(9),
            crossfade_steps: 20,
            restart_threshold: Duration::from_secs(3),
            preload_count: 10,
            auto_crossfade_epsilon: Duration::from_millis(50),
            seek_tolerance: Duration::from_millis(500),
            media_album: "Project SEKAI".to_string(),
            key_seek_step: Duration::from_secs(5),
            key_volume_step: 10,
        }
    }
}
