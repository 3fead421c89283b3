//! SEKAI Player - Playback
//!
//! Platform-agnostic playback control for the SEKAI player.
//!
//! This crate provides:
//! - Two output handles driven by one controller, with crossfade between them
//! - A session (current track, playlist snapshot, shuffle, repeat, volume)
//! - Intro skipping: every asset starts with a silent lead-in that is never
//!   played and never shown
//! - Transport mapping for pointer gestures, keyboard shortcuts and OS
//!   media-session actions
//!
//! # Architecture
//!
//! The controller owns no audio code and never blocks. The host supplies:
//! - two [`AudioSink`]s (media elements, decoders, test fakes)
//! - a [`Scheduler`] for the crossfade ramp timer
//! - optionally an [`AssetPreloader`] that warms upcoming tracks
//!
//! and forwards handle notifications to
//! [`PlaybackController::handle_sink_event`] and timer ticks to
//! [`PlaybackController::handle_timer`]. UI updates come back as
//! [`PlayerEvent`]s through [`PlaybackController::drain_events`].
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use sekai_playback::{IntroSkip, Volume, VolumeIndicator};
//!
//! let timeline = IntroSkip::new(Duration::from_secs(9));
//! assert_eq!(
//!     timeline.displayed_duration(Duration::from_secs(189)),
//!     Duration::from_secs(180)
//! );
//!
//! let mut volume = Volume::from_percent(80);
//! volume.toggle_mute();
//! assert_eq!(volume.indicator(), VolumeIndicator::Muted);
//! ```

mod controller;
mod crossfade;
mod error;
mod events;
mod preload;
mod scheduler;
mod session;
mod sink;
mod timeline;
mod transport;
pub mod types;
mod volume;

// Public exports
pub use controller::PlaybackController;
pub use crossfade::{ramp_gains, CrossfadeRamp, CrossfadeSettings, RampStep};
pub use error::{PlaybackError, Result};
pub use events::{Artwork, MediaMetadata, NowPlaying, PlayerEvent};
pub use preload::{preload_window, AssetPreloader, NoopPreloader};
pub use scheduler::Scheduler;
pub use session::{CurrentTrack, PlaybackSession};
pub use sink::{AudioSink, SinkEvent};
pub use timeline::{IntroSkip, SeekTarget};
pub use transport::{Gesture, Key, MediaAction, TransportAdapter};
pub use types::{HandleId, PlayTicket, PlaybackConfig, PlayerState, TimerId};
pub use volume::{Volume, VolumeIndicator};
