//! Playback controller - core orchestration
//!
//! Owns the two output handles and the session, and turns user operations
//! and raw handle events into handle commands and [`PlayerEvent`]s.
//!
//! The controller never waits. A start request on a handle is tagged with a
//! [`PlayTicket`]; its outcome comes back through
//! [`PlaybackController::handle_sink_event`] and is ignored when the ticket
//! is no longer the one awaited on that handle. A crossfade ramp is driven
//! by a host timer that is cancelled as soon as the ramp is superseded.

use std::sync::Arc;
use std::time::Duration;

use sekai_core::{preferred_vocal, AssetUrls, Playlist, Preferences, Track, TrackId, VocalVariant};
use tracing::{debug, info, warn};

use crate::{
    crossfade::{CrossfadeRamp, CrossfadeSettings},
    error::{PlaybackError, Result},
    events::{MediaMetadata, NowPlaying, PlayerEvent},
    preload::{preload_window, AssetPreloader, NoopPreloader},
    scheduler::Scheduler,
    session::{CurrentTrack, PlaybackSession},
    sink::{AudioSink, SinkEvent},
    timeline::{IntroSkip, SeekTarget},
    types::{HandleId, PlayTicket, PlaybackConfig, PlayerState, TimerId},
    volume::Volume,
};

/// What a pending start is for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StartKind {
    /// First start of a newly selected track
    Track { track_id: TrackId, crossfade: bool },
    /// Resume or repeat of the loaded track
    Resume,
}

/// Start awaited on one handle
#[derive(Debug, Clone, Copy)]
struct PendingStart {
    kind: StartKind,
    /// `None` while waiting for metadata
    ticket: Option<PlayTicket>,
}

/// Session position to restore when a crossfade start fails
#[derive(Debug, Clone)]
struct SessionPosition {
    current: Option<CurrentTrack>,
    playlist: Playlist,
    index: Option<usize>,
}

/// Crossfade in progress
#[derive(Debug)]
struct Transition {
    from: HandleId,
    to: HandleId,
    /// Started once the incoming handle is playing
    ramp: Option<CrossfadeRamp>,
    previous: SessionPosition,
}

/// Playback controller
///
/// Exactly two handles exist for the controller's lifetime; only their
/// sources change. The active-handle pointer is the only routing state and
/// is resolved on every operation.
pub struct PlaybackController {
    sinks: [Box<dyn AudioSink>; 2],
    scheduler: Box<dyn Scheduler>,
    preloader: Arc<dyn AssetPreloader>,
    urls: AssetUrls,
    config: PlaybackConfig,
    timeline: IntroSkip,
    prefs: Preferences,

    session: PlaybackSession,
    active: HandleId,
    transition: Option<Transition>,
    pending: [Option<PendingStart>; 2],
    /// Track paused before its first start; its play is recorded on resume
    unrecorded: Option<TrackId>,
    next_ticket: u64,
    buffering: bool,

    // Event queue for UI synchronization
    last_state: PlayerState,
    pending_events: Vec<PlayerEvent>,
}

impl PlaybackController {
    /// Create a controller driving `sinks[0]` as handle A and `sinks[1]` as handle B
    pub fn new(
        sinks: [Box<dyn AudioSink>; 2],
        scheduler: Box<dyn Scheduler>,
        config: PlaybackConfig,
    ) -> Self {
        let prefs = Preferences::default();
        let volume = Volume::new(prefs.volume);
        let mut controller = Self {
            sinks,
            scheduler,
            preloader: Arc::new(NoopPreloader),
            urls: AssetUrls::default(),
            timeline: IntroSkip::new(config.intro_skip),
            config,
            prefs,
            session: PlaybackSession::new(volume),
            active: HandleId::A,
            transition: None,
            pending: [None, None],
            unrecorded: None,
            next_ticket: 0,
            buffering: false,
            last_state: PlayerState::Idle,
            pending_events: Vec::new(),
        };
        controller.apply_volume_to_sinks();
        controller
    }

    pub fn with_preloader(mut self, preloader: Arc<dyn AssetPreloader>) -> Self {
        self.preloader = preloader;
        self
    }

    pub fn with_asset_urls(mut self, urls: AssetUrls) -> Self {
        self.urls = urls;
        self
    }

    /// Apply preferences, including their volume
    pub fn with_preferences(mut self, prefs: Preferences) -> Self {
        let prefs = prefs.sanitized();
        self.session.volume.set_level(prefs.volume);
        self.prefs = prefs;
        self.apply_volume_to_sinks();
        self
    }

    // ===== Playback Control =====

    /// Play `vocal` of `track`, taking `playlist` as the new session playlist
    ///
    /// Crossfades only when `use_crossfade` is set, crossfade is enabled in
    /// the preferences, something is playing and no crossfade is running.
    /// Session state is updated before the start completes; a rejected
    /// start is reported as [`PlayerEvent::PlaybackFailed`], not as an error.
    ///
    /// # Errors
    ///
    /// Returns [`PlaybackError::VocalMismatch`] if `vocal` is not a variant of `track`.
    pub fn play(
        &mut self,
        track: Arc<Track>,
        vocal: VocalVariant,
        playlist: Playlist,
        use_crossfade: bool,
    ) -> Result<()> {
        if !track.has_vocal(&vocal) {
            return Err(PlaybackError::VocalMismatch {
                track: track.id,
                asset: vocal.asset,
            });
        }

        self.session.playlist = playlist;
        self.start_track(track, vocal, use_crossfade);
        Ok(())
    }

    /// Play `track` with the variant chosen by the vocal priority
    pub fn play_preferred(
        &mut self,
        track: Arc<Track>,
        playlist: Playlist,
        use_crossfade: bool,
    ) -> Result<()> {
        let vocal = preferred_vocal(&track, self.prefs.vocal_priority)
            .cloned()
            .ok_or(PlaybackError::NoVocals(track.id))?;
        self.play(track, vocal, playlist, use_crossfade)
    }

    /// Advance to the next playlist entry (random one with shuffle on)
    pub fn play_next(&mut self, use_crossfade: bool) -> Result<()> {
        let index = self
            .session
            .next_index(&mut rand::thread_rng())
            .ok_or(PlaybackError::PlaylistEmpty)?;
        self.play_index(index, use_crossfade)
    }

    /// Restart the current track, or go back one entry
    ///
    /// Restarts when the active handle is more than the restart threshold
    /// past the intro; never crossfades.
    pub fn play_prev(&mut self) -> Result<()> {
        if self.session.playlist.is_empty() {
            return Err(PlaybackError::PlaylistEmpty);
        }

        if self.session.current.is_some() {
            let position = self.active_sink().position();
            if position > self.timeline.offset() + self.config.restart_threshold {
                debug!(position = ?position, "Restarting current track");
                let offset = self.timeline.offset();
                self.active_sink_mut().seek(offset);
                self.emit_progress(self.active);
                return Ok(());
            }
        }

        let index = self
            .session
            .prev_index(&mut rand::thread_rng())
            .ok_or(PlaybackError::PlaylistEmpty)?;
        self.play_index(index, false)
    }

    fn play_index(&mut self, index: usize, use_crossfade: bool) -> Result<()> {
        let track = self
            .session
            .playlist
            .get(index)
            .cloned()
            .ok_or(PlaybackError::PlaylistEmpty)?;
        let vocal = preferred_vocal(&track, self.prefs.vocal_priority)
            .cloned()
            .ok_or(PlaybackError::NoVocals(track.id))?;
        self.start_track(track, vocal, use_crossfade);
        Ok(())
    }

    fn start_track(&mut self, track: Arc<Track>, vocal: VocalVariant, use_crossfade: bool) {
        let do_crossfade = use_crossfade
            && self.prefs.crossfade
            && self.session.playing
            && self.transition.is_none();

        if do_crossfade {
            let from = self.active;
            self.active = from.other();
            self.transition = Some(Transition {
                from,
                to: self.active,
                ramp: None,
                previous: SessionPosition {
                    current: self.session.current.clone(),
                    playlist: self.session.playlist.clone(),
                    index: self.session.index,
                },
            });
        } else {
            // a running crossfade is superseded
            self.finish_transition();
            self.reset_handle(self.active.other());

            // the reused handle keeps its position: resetting it before the
            // new source loads would replay the old track from the start
            let handle = self.active;
            if !self.sinks[handle.index()].is_paused() {
                self.sinks[handle.index()].pause();
            }
            self.pending[handle.index()] = None;
        }

        let handle = self.active;
        let url = self.urls.vocal_audio(&vocal);
        info!(
            track_id = %track.id,
            vocal = %vocal.asset,
            handle = ?handle,
            crossfade = do_crossfade,
            "Starting track"
        );

        self.session.playing = true;
        self.unrecorded = None;
        let track_id = track.id;
        self.session.set_current(track, vocal);

        let gain = if do_crossfade {
            0.0
        } else {
            self.session.volume.level()
        };
        let muted = self.session.volume.is_muted();
        let offset = self.timeline.offset();
        let sink = &mut self.sinks[handle.index()];
        if sink.source().as_deref() != Some(url.as_str()) {
            sink.load(&url);
        } else {
            // same asset: restart it instead of reloading
            sink.seek(offset);
        }
        sink.set_gain(gain);
        sink.set_muted(muted);

        self.pending[handle.index()] = Some(PendingStart {
            kind: StartKind::Track {
                track_id,
                crossfade: do_crossfade,
            },
            ticket: None,
        });

        // UI and media session reflect the new track before it starts
        self.announce_current();
        self.set_buffering(true);
        self.begin_start(handle);
        self.sync_state();
    }

    /// Resume the active handle
    pub fn resume(&mut self) -> Result<()> {
        if self.session.current.is_none() {
            return Err(PlaybackError::NoTrackLoaded);
        }

        let handle = self.active;
        self.session.playing = true;

        let awaiting_track = matches!(
            self.pending[handle.index()],
            Some(PendingStart {
                kind: StartKind::Track { .. },
                ..
            })
        );
        if awaiting_track {
            // the pending start plays the track once it is ready
            self.sync_state();
            return Ok(());
        }

        if self.transition.is_none() {
            let level = self.session.volume.level();
            self.sinks[handle.index()].set_gain(level);
        }
        let muted = self.session.volume.is_muted();
        self.sinks[handle.index()].set_muted(muted);

        let kind = match self.unrecorded.take() {
            Some(track_id) => StartKind::Track {
                track_id,
                crossfade: false,
            },
            None => StartKind::Resume,
        };
        self.pending[handle.index()] = Some(PendingStart { kind, ticket: None });
        self.begin_start(handle);
        self.sync_state();
        Ok(())
    }

    /// Pause playback
    ///
    /// A running crossfade is completed first so the outgoing track does
    /// not keep playing.
    pub fn pause(&mut self) {
        self.finish_transition();

        let handle = self.active;
        self.sinks[handle.index()].pause();
        if let Some(PendingStart {
            kind: StartKind::Track { track_id, .. },
            ..
        }) = self.pending[handle.index()].take()
        {
            self.unrecorded = Some(track_id);
        }
        self.session.playing = false;
        self.set_buffering(false);
        self.sync_state();
    }

    /// Pause when playing, resume otherwise
    pub fn toggle_play_pause(&mut self) -> Result<()> {
        if self.session.playing {
            self.pause();
            Ok(())
        } else {
            self.resume()
        }
    }

    /// Stop playback
    ///
    /// Stops both handles and clears the current track (but not the playlist)
    pub fn stop(&mut self) {
        self.finish_transition();
        self.reset_handle(HandleId::A);
        self.reset_handle(HandleId::B);

        self.session.current = None;
        self.session.index = None;
        self.session.playing = false;
        self.unrecorded = None;
        self.set_buffering(false);
        self.sync_state();
    }

    // ===== Seek =====

    /// Seek the active handle to a displayed position
    ///
    /// The raw target never lies inside the intro and never past the end.
    pub fn seek(&mut self, displayed: Duration) -> Result<()> {
        let duration = self.seekable_duration()?;
        let raw = self.timeline.raw_seek_target(displayed, Some(duration));
        self.active_sink_mut().seek(raw);
        self.emit_progress(self.active);
        Ok(())
    }

    /// Seek to a fraction (0.0 - 1.0) of the displayed duration
    pub fn seek_fraction(&mut self, fraction: f64) -> Result<()> {
        let duration = self.seekable_duration()?;
        let target = self
            .timeline
            .seek_from_fraction(fraction, Some(duration))
            .ok_or(PlaybackError::DurationUnknown)?;
        self.active_sink_mut().seek(target.raw);
        self.emit_progress(self.active);
        Ok(())
    }

    /// Show where a drag at `fraction` would seek to, without seeking
    pub fn preview_seek(&mut self, fraction: f64) -> Option<SeekTarget> {
        let target = self
            .timeline
            .seek_from_fraction(fraction, self.active_sink().duration())?;
        self.pending_events.push(PlayerEvent::SeekPreview {
            position: target.displayed,
            percent: target.percent,
        });
        Some(target)
    }

    /// Move the active handle by a signed number of seconds
    pub fn seek_by(&mut self, delta_secs: f64) -> Result<()> {
        if self.session.current.is_none() {
            return Err(PlaybackError::NoTrackLoaded);
        }
        let sink = self.active_sink();
        let raw = self
            .timeline
            .nudge(sink.position(), delta_secs, sink.duration());
        self.active_sink_mut().seek(raw);
        self.emit_progress(self.active);
        Ok(())
    }

    fn seekable_duration(&self) -> Result<Duration> {
        if self.session.current.is_none() {
            return Err(PlaybackError::NoTrackLoaded);
        }
        self.active_sink()
            .duration()
            .filter(|d| !d.is_zero())
            .ok_or(PlaybackError::DurationUnknown)
    }

    // ===== Volume =====

    /// Set volume (0.0 - 1.0)
    pub fn set_volume(&mut self, level: f32) {
        self.session.volume.set_level(level);
        self.apply_volume_to_sinks();
        self.emit_volume_changed();
    }

    /// Set volume from a slider percentage (0-100)
    pub fn set_volume_percent(&mut self, percent: u8) {
        self.session.volume.set_percent(percent);
        self.apply_volume_to_sinks();
        self.emit_volume_changed();
    }

    /// Move volume by a signed number of percentage points
    pub fn step_volume(&mut self, delta: i32) {
        self.session.volume.step_percent(delta);
        self.apply_volume_to_sinks();
        self.emit_volume_changed();
    }

    pub fn toggle_mute(&mut self) {
        let muted = self.session.volume.toggle_mute();
        for sink in &mut self.sinks {
            sink.set_muted(muted);
        }
        self.emit_volume_changed();
    }

    pub fn volume(&self) -> &Volume {
        &self.session.volume
    }

    fn apply_volume_to_sinks(&mut self) {
        let level = self.session.volume.level();
        match &self.transition {
            // the ramp applies the new level on its next step
            Some(t) if t.ramp.is_some() => {}
            Some(t) => self.sinks[t.from.index()].set_gain(level),
            None => {
                for sink in &mut self.sinks {
                    sink.set_gain(level);
                }
            }
        }
    }

    // ===== Repeat & Shuffle =====

    pub fn set_repeat(&mut self, enabled: bool) {
        self.session.repeat = enabled;
        self.pending_events.push(PlayerEvent::RepeatChanged { enabled });
    }

    pub fn toggle_repeat(&mut self) -> bool {
        let enabled = !self.session.repeat;
        self.set_repeat(enabled);
        enabled
    }

    pub fn set_shuffle(&mut self, enabled: bool) {
        self.session.shuffle = enabled;
        self.pending_events.push(PlayerEvent::ShuffleChanged { enabled });
    }

    pub fn toggle_shuffle(&mut self) -> bool {
        let enabled = !self.session.shuffle;
        self.set_shuffle(enabled);
        enabled
    }

    /// Ask the UI to show lyrics for the current track
    pub fn request_lyrics(&mut self) -> Option<TrackId> {
        let track_id = self.session.current.as_ref()?.track.id;
        self.pending_events
            .push(PlayerEvent::LyricsRequested { track_id });
        Some(track_id)
    }

    // ===== Preferences =====

    /// Replace the preferences; the volume in `prefs` is not applied
    pub fn set_preferences(&mut self, prefs: Preferences) {
        self.prefs = prefs.sanitized();
    }

    pub fn preferences(&self) -> &Preferences {
        &self.prefs
    }

    pub fn crossfade_settings(&self) -> CrossfadeSettings {
        CrossfadeSettings::from_preferences(&self.prefs, self.config.crossfade_steps)
    }

    // ===== State Queries =====

    /// Current state, derived from the session and the handles
    pub fn state(&self) -> PlayerState {
        if self.transition.is_some() {
            PlayerState::Transitioning
        } else if self.session.current.is_none() {
            PlayerState::Idle
        } else if matches!(
            self.pending[self.active.index()],
            Some(PendingStart {
                kind: StartKind::Track { .. },
                ..
            })
        ) {
            PlayerState::Loading
        } else if self.session.playing {
            PlayerState::Playing
        } else {
            PlayerState::Paused
        }
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    pub fn active_handle(&self) -> HandleId {
        self.active
    }

    pub fn session(&self) -> &PlaybackSession {
        &self.session
    }

    pub fn current(&self) -> Option<&CurrentTrack> {
        self.session.current.as_ref()
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    pub fn timeline(&self) -> &IntroSkip {
        &self.timeline
    }

    /// Read access to one output handle
    pub fn sink(&self, handle: HandleId) -> &dyn AudioSink {
        self.sinks[handle.index()].as_ref()
    }

    /// Displayed position of the active handle
    pub fn position(&self) -> Duration {
        self.timeline.displayed_position(self.active_sink().position())
    }

    /// Displayed duration of the active handle, once known
    pub fn duration(&self) -> Option<Duration> {
        self.active_sink()
            .duration()
            .map(|d| self.timeline.displayed_duration(d))
    }

    fn active_sink(&self) -> &dyn AudioSink {
        self.sinks[self.active.index()].as_ref()
    }

    fn active_sink_mut(&mut self) -> &mut dyn AudioSink {
        self.sinks[self.active.index()].as_mut()
    }

    // ===== Handle Events =====

    /// Dispatch a raw event from `handle`
    pub fn handle_sink_event(&mut self, handle: HandleId, event: SinkEvent) {
        let is_active = handle == self.active;
        match event {
            SinkEvent::MetadataLoaded => {
                self.begin_start(handle);
                if is_active {
                    self.emit_progress(handle);
                }
            }
            SinkEvent::PlayStarted(ticket) => self.on_play_started(handle, ticket),
            SinkEvent::PlayRejected { ticket, reason } => {
                self.on_play_rejected(handle, ticket, reason);
            }
            SinkEvent::Playing => self.on_play_state(handle, true),
            SinkEvent::Paused => self.on_play_state(handle, false),
            SinkEvent::TimeUpdate => {
                if is_active {
                    self.emit_progress(handle);
                    self.check_auto_crossfade();
                }
            }
            SinkEvent::Buffered(end) => {
                if is_active {
                    let percent = self
                        .timeline
                        .buffered_percent(end, self.sinks[handle.index()].duration());
                    self.pending_events.push(PlayerEvent::Buffered { percent });
                }
            }
            SinkEvent::Waiting => {
                if is_active {
                    self.set_buffering(true);
                }
            }
            SinkEvent::Ended => self.on_ended(handle),
            SinkEvent::Error(message) => {
                warn!(handle = ?handle, error = %message, "Output handle error");
                if is_active {
                    self.set_buffering(false);
                }
                self.pending_events.push(PlayerEvent::Error { message });
            }
        }
        self.sync_state();
    }

    /// Mirror play/pause changes the controller did not initiate
    fn on_play_state(&mut self, handle: HandleId, playing: bool) {
        if handle != self.active {
            return;
        }
        // while a start is pending or a ramp runs, the controller's own
        // commands already decided the session state
        if self.transition.is_none() && self.pending[handle.index()].is_none() {
            self.session.playing = playing;
        }
        if playing {
            self.set_buffering(false);
        }
    }

    /// Issue the start request for `handle` once it is ready
    fn begin_start(&mut self, handle: HandleId) {
        let index = handle.index();
        let awaiting = matches!(self.pending[index], Some(PendingStart { ticket: None, .. }));
        if !awaiting || !self.sinks[index].is_ready() {
            return;
        }

        self.skip_intro(handle);
        self.next_ticket += 1;
        let ticket = PlayTicket(self.next_ticket);
        if let Some(pending) = self.pending[index].as_mut() {
            pending.ticket = Some(ticket);
        }
        debug!(handle = ?handle, ticket = ticket.0, "Requesting playback");
        self.sinks[index].play(ticket);
    }

    fn skip_intro(&mut self, handle: HandleId) {
        let sink = &mut self.sinks[handle.index()];
        if self
            .timeline
            .is_in_intro(sink.position(), self.config.seek_tolerance)
        {
            sink.seek(self.timeline.offset());
        }
    }

    /// Take the pending start of `handle` if it is waiting for `ticket`
    fn take_pending(&mut self, handle: HandleId, ticket: PlayTicket) -> Option<PendingStart> {
        let slot = &mut self.pending[handle.index()];
        if slot.is_some_and(|p| p.ticket == Some(ticket)) {
            slot.take()
        } else {
            debug!(handle = ?handle, ticket = ticket.0, "Ignoring stale start outcome");
            None
        }
    }

    fn on_play_started(&mut self, handle: HandleId, ticket: PlayTicket) {
        let Some(pending) = self.take_pending(handle, ticket) else {
            return;
        };

        // some platforms only honor the seek once playback runs
        self.skip_intro(handle);

        match pending.kind {
            StartKind::Track {
                track_id,
                crossfade,
            } => {
                self.pending_events
                    .push(PlayerEvent::PlayRecorded { track_id });
                if crossfade {
                    self.start_ramp(handle);
                }
            }
            StartKind::Resume => {
                if self.transition.is_none() {
                    let level = self.session.volume.level();
                    self.sinks[handle.index()].set_gain(level);
                }
            }
        }

        if handle == self.active {
            self.session.playing = true;
            self.set_buffering(false);
        }
    }

    fn on_play_rejected(&mut self, handle: HandleId, ticket: PlayTicket, reason: String) {
        let Some(pending) = self.take_pending(handle, ticket) else {
            return;
        };
        warn!(handle = ?handle, reason = %reason, "Playback start rejected");

        let incoming_crossfade = matches!(
            pending.kind,
            StartKind::Track {
                crossfade: true,
                ..
            }
        ) && self.transition.as_ref().is_some_and(|t| t.to == handle);

        if incoming_crossfade {
            self.unwind_transition();
        } else if handle == self.active {
            self.session.playing = false;
            self.set_buffering(false);
        }
        self.pending_events
            .push(PlayerEvent::PlaybackFailed { reason });
    }

    fn on_ended(&mut self, handle: HandleId) {
        if handle != self.active {
            // the outgoing handle of a crossfade may run out before the ramp ends
            debug!(handle = ?handle, "Ignoring end of inactive handle");
            return;
        }
        if self.session.current.is_none() {
            return;
        }
        self.finish_transition();

        if self.session.repeat {
            debug!("Repeating current track");
            let offset = self.timeline.offset();
            self.sinks[handle.index()].seek(offset);
            self.pending[handle.index()] = Some(PendingStart {
                kind: StartKind::Resume,
                ticket: None,
            });
            self.session.playing = true;
            self.begin_start(handle);
        } else if self.prefs.autoplay {
            if let Err(e) = self.play_next(false) {
                debug!(error = %e, "Auto-advance not possible");
                self.session.playing = false;
            }
        } else {
            self.session.playing = false;
        }
    }

    /// Start the next track early when the active one is about to end
    fn check_auto_crossfade(&mut self) {
        if !self.prefs.crossfade
            || !self.prefs.autoplay
            || self.session.repeat
            || !self.session.playing
            || self.transition.is_some()
            || self.pending[self.active.index()].is_some()
        {
            return;
        }

        let sink = self.active_sink();
        let Some(duration) = sink.duration() else {
            return;
        };
        let remaining = duration.saturating_sub(sink.position());
        let window = self.crossfade_settings().duration;

        if remaining > self.config.auto_crossfade_epsilon && remaining <= window {
            debug!(remaining = ?remaining, "Auto-crossfading into next track");
            if let Err(e) = self.play_next(true) {
                debug!(error = %e, "Auto-crossfade not possible");
            }
        }
    }

    // ===== Crossfade =====

    fn start_ramp(&mut self, handle: HandleId) {
        let settings = self.crossfade_settings();
        let Some(transition) = self.transition.as_mut() else {
            return;
        };
        if transition.to != handle || transition.ramp.is_some() {
            return;
        }

        let timer = self.scheduler.start_interval(settings.step_interval());
        transition.ramp = Some(CrossfadeRamp::new(timer, settings.steps));
        debug!(from = ?transition.from, to = ?transition.to, "Crossfade started");
        self.pending_events.push(PlayerEvent::CrossfadeStarted {
            from: transition.from,
            to: transition.to,
            duration: settings.duration,
        });
    }

    /// Advance the crossfade ramp owning `timer`
    ///
    /// Ticks of cancelled or unknown timers are ignored.
    pub fn handle_timer(&mut self, timer: TimerId) {
        let volume = self.session.volume.level();
        let Some(transition) = self.transition.as_mut() else {
            return;
        };
        let Some(ramp) = transition.ramp.as_mut().filter(|r| r.timer() == timer) else {
            return;
        };

        let step = ramp.advance(volume);
        let progress = ramp.progress();
        let (from, to) = (transition.from, transition.to);

        if !self.sinks[from.index()].is_paused() {
            self.sinks[from.index()].set_gain(step.fade_out);
        }
        if !self.sinks[to.index()].is_paused() {
            self.sinks[to.index()].set_gain(step.fade_in);
        }
        self.pending_events
            .push(PlayerEvent::CrossfadeProgress { progress });

        if step.finished {
            self.finish_transition();
            self.sync_state();
        }
    }

    /// Complete or supersede the running crossfade
    ///
    /// Stops the outgoing handle at position 0 and restores both gains.
    fn finish_transition(&mut self) {
        let Some(transition) = self.transition.take() else {
            return;
        };
        if let Some(ramp) = &transition.ramp {
            self.scheduler.cancel(ramp.timer());
        }

        let level = self.session.volume.level();
        self.reset_handle(transition.from);
        self.sinks[transition.to.index()].set_gain(level);
        debug!(from = ?transition.from, to = ?transition.to, "Crossfade finished");
        self.pending_events.push(PlayerEvent::CrossfadeCompleted);
    }

    /// Abort a crossfade whose incoming start failed
    ///
    /// The outgoing handle keeps playing at full volume and becomes active
    /// again, and the session returns to the outgoing track.
    fn unwind_transition(&mut self) {
        let Some(transition) = self.transition.take() else {
            return;
        };
        if let Some(ramp) = &transition.ramp {
            self.scheduler.cancel(ramp.timer());
        }

        let level = self.session.volume.level();
        self.reset_handle(transition.to);
        self.sinks[transition.from.index()].set_gain(level);
        self.active = transition.from;

        let previous = transition.previous;
        self.session.current = previous.current;
        self.session.playlist = previous.playlist;
        self.session.index = previous.index;
        warn!(handle = ?transition.from, "Crossfade aborted, keeping previous track");

        self.pending_events.push(PlayerEvent::CrossfadeCompleted);
        self.announce_current();
        self.set_buffering(false);
    }

    /// Pause a handle, rewind it and restore its gain
    fn reset_handle(&mut self, handle: HandleId) {
        let level = self.session.volume.level();
        let sink = &mut self.sinks[handle.index()];
        sink.pause();
        sink.seek(Duration::ZERO);
        sink.set_gain(level);
        self.pending[handle.index()] = None;
    }

    // ===== Events =====

    /// Drain all pending events
    ///
    /// Returns all events that have been emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<PlayerEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Check if there are pending events
    pub fn has_pending_events(&self) -> bool {
        !self.pending_events.is_empty()
    }

    /// Emit a state changed event if the derived state moved
    fn sync_state(&mut self) {
        let state = self.state();
        if state != self.last_state {
            debug!(from = ?self.last_state, to = ?state, "State changed");
            self.last_state = state;
            self.pending_events.push(PlayerEvent::StateChanged { state });
        }
    }

    /// Emit now-playing and media metadata, and prefetch what comes next
    fn announce_current(&mut self) {
        let Some(current) = &self.session.current else {
            return;
        };
        let now_playing = NowPlaying::new(&current.track, &current.vocal, &self.urls);
        let metadata = MediaMetadata::new(&now_playing, &self.config.media_album);

        let upcoming = match self.session.index {
            Some(index) => preload_window(
                &self.session.playlist,
                index,
                self.config.preload_count,
                self.prefs.vocal_priority,
                &self.urls,
            ),
            None => vec![
                now_playing.audio_url.clone(),
                now_playing.jacket_url.clone(),
            ],
        };

        self.pending_events
            .push(PlayerEvent::TrackChanged(now_playing));
        self.pending_events
            .push(PlayerEvent::MediaMetadata(metadata));

        if !upcoming.is_empty() {
            debug!(count = upcoming.len(), "Preloading upcoming assets");
            self.preloader.preload(upcoming);
        }
    }

    fn emit_progress(&mut self, handle: HandleId) {
        let sink = &self.sinks[handle.index()];
        let raw_duration = sink.duration();
        let position = self.timeline.displayed_position(sink.position());
        let duration = raw_duration.map_or(Duration::ZERO, |d| self.timeline.displayed_duration(d));
        let percent = self.timeline.percent(sink.position(), raw_duration);
        self.pending_events.push(PlayerEvent::Progress {
            position,
            duration,
            percent,
        });
    }

    fn emit_volume_changed(&mut self) {
        let volume = &self.session.volume;
        self.pending_events.push(PlayerEvent::VolumeChanged {
            level: volume.level(),
            muted: volume.is_muted(),
            indicator: volume.indicator(),
        });
    }

    fn set_buffering(&mut self, active: bool) {
        if self.buffering != active {
            self.buffering = active;
            self.pending_events.push(PlayerEvent::Buffering { active });
        }
    }
}

impl std::fmt::Debug for PlaybackController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackController")
            .field("state", &self.state())
            .field("active", &self.active)
            .field("transition", &self.transition)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}
