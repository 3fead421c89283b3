//! Audio output handle abstraction
//!
//! Abstracts the platform's media element so the controller can drive two
//! of them without knowing how audio is produced.

use std::time::Duration;

use crate::types::PlayTicket;

/// One audio output handle
///
/// Positions and durations are raw, i.e. measured from the very start of
/// the asset including the intro region. Methods never block: `play` only
/// requests a start, and the outcome arrives later as
/// [`SinkEvent::PlayStarted`] or [`SinkEvent::PlayRejected`] carrying the
/// same ticket.
pub trait AudioSink: Send {
    /// Assign a new source and start loading it
    fn load(&mut self, url: &str);

    /// Currently assigned source
    fn source(&self) -> Option<String>;

    /// Request playback
    fn play(&mut self, ticket: PlayTicket);

    fn pause(&mut self);

    /// Move the raw playback position
    fn seek(&mut self, position: Duration);

    /// Set the output gain (0.0 - 1.0)
    fn set_gain(&mut self, gain: f32);

    fn gain(&self) -> f32;

    fn set_muted(&mut self, muted: bool);

    /// Raw playback position
    fn position(&self) -> Duration;

    /// Raw duration, once metadata is known
    fn duration(&self) -> Option<Duration>;

    fn is_paused(&self) -> bool;

    /// Whether metadata is available (a seek will be honored)
    fn is_ready(&self) -> bool;
}

/// Raw notifications from an output handle
///
/// The host forwards these to [`crate::PlaybackController::handle_sink_event`]
/// together with the handle they came from.
#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    /// Metadata (duration) became available
    MetadataLoaded,

    /// The start requested with this ticket succeeded
    PlayStarted(PlayTicket),

    /// The start requested with this ticket failed
    PlayRejected { ticket: PlayTicket, reason: String },

    /// Playback started or resumed, by any cause
    Playing,

    /// Playback paused, by any cause
    Paused,

    /// Position advanced
    TimeUpdate,

    /// Raw end of the buffered range advanced
    Buffered(Duration),

    /// Playback stalled waiting for data
    Waiting,

    /// Reached the end of the source
    Ended,

    /// Media error
    Error(String),
}
