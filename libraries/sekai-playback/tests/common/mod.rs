//! Shared fakes for controller tests
//!
//! `FakeSink` models a media element closely enough for the controller:
//! a freshly loaded source is not ready (no duration, seeks pending) until
//! the test delivers metadata, and `play` only records the request.

#![allow(dead_code)]

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use sekai_core::{Playlist, Preferences, Track, VocalKind, VocalVariant};
use sekai_playback::{
    AudioSink, HandleId, PlayTicket, PlaybackConfig, PlaybackController, PlayerEvent, Scheduler,
    SinkEvent, TimerId,
};

/// Raw length of every fake asset (9s intro + 3:00)
pub const ASSET_LENGTH: Duration = Duration::from_secs(189);

// ============================================================================
// Fake sink
// ============================================================================

#[derive(Debug)]
pub struct SinkState {
    pub source: Option<String>,
    pub position: Duration,
    pub duration: Option<Duration>,
    pub gain: f32,
    pub muted: bool,
    pub paused: bool,
    pub ready: bool,
    pub tickets: Vec<PlayTicket>,
    pub loads: Vec<String>,
    pub seeks: Vec<Duration>,
}

impl Default for SinkState {
    fn default() -> Self {
        Self {
            source: None,
            position: Duration::ZERO,
            duration: None,
            gain: 1.0,
            muted: false,
            paused: true,
            ready: false,
            tickets: Vec::new(),
            loads: Vec::new(),
            seeks: Vec::new(),
        }
    }
}

/// Test-side view of a fake sink
#[derive(Debug, Clone, Default)]
pub struct SinkProbe(Arc<Mutex<SinkState>>);

impl SinkProbe {
    pub fn state(&self) -> MutexGuard<'_, SinkState> {
        self.0.lock().unwrap()
    }

    pub fn last_ticket(&self) -> PlayTicket {
        *self.state().tickets.last().expect("no play requested")
    }
}

pub struct FakeSink(SinkProbe);

impl AudioSink for FakeSink {
    fn load(&mut self, url: &str) {
        let mut s = self.0.state();
        s.source = Some(url.to_string());
        s.loads.push(url.to_string());
        s.position = Duration::ZERO;
        s.duration = None;
        s.ready = false;
        s.paused = true;
    }

    fn source(&self) -> Option<String> {
        self.0.state().source.clone()
    }

    fn play(&mut self, ticket: PlayTicket) {
        let mut s = self.0.state();
        s.tickets.push(ticket);
        s.paused = false;
    }

    fn pause(&mut self) {
        self.0.state().paused = true;
    }

    fn seek(&mut self, position: Duration) {
        let mut s = self.0.state();
        s.seeks.push(position);
        s.position = match s.duration {
            Some(end) => position.min(end),
            None => position,
        };
    }

    fn set_gain(&mut self, gain: f32) {
        self.0.state().gain = gain;
    }

    fn gain(&self) -> f32 {
        self.0.state().gain
    }

    fn set_muted(&mut self, muted: bool) {
        self.0.state().muted = muted;
    }

    fn position(&self) -> Duration {
        self.0.state().position
    }

    fn duration(&self) -> Option<Duration> {
        self.0.state().duration
    }

    fn is_paused(&self) -> bool {
        self.0.state().paused
    }

    fn is_ready(&self) -> bool {
        self.0.state().ready
    }
}

// ============================================================================
// Manual scheduler
// ============================================================================

#[derive(Debug, Default)]
pub struct TimerState {
    pub next: u64,
    pub active: Vec<(TimerId, Duration)>,
    pub cancelled: Vec<TimerId>,
}

#[derive(Debug, Clone, Default)]
pub struct TimerProbe(Arc<Mutex<TimerState>>);

impl TimerProbe {
    pub fn state(&self) -> MutexGuard<'_, TimerState> {
        self.0.lock().unwrap()
    }

    pub fn active(&self) -> Vec<TimerId> {
        self.state().active.iter().map(|(id, _)| *id).collect()
    }
}

pub struct ManualScheduler(TimerProbe);

impl Scheduler for ManualScheduler {
    fn start_interval(&mut self, period: Duration) -> TimerId {
        let mut s = self.0.state();
        s.next += 1;
        let id = TimerId(s.next);
        s.active.push((id, period));
        id
    }

    fn cancel(&mut self, id: TimerId) {
        let mut s = self.0.state();
        s.active.retain(|(active, _)| *active != id);
        s.cancelled.push(id);
    }
}

// ============================================================================
// Harness
// ============================================================================

pub struct Harness {
    pub controller: PlaybackController,
    pub sinks: [SinkProbe; 2],
    pub timers: TimerProbe,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_preferences(Preferences::default())
    }

    pub fn with_crossfade() -> Self {
        Self::with_preferences(Preferences {
            crossfade: true,
            ..Preferences::default()
        })
    }

    pub fn with_preferences(prefs: Preferences) -> Self {
        let sinks = [SinkProbe::default(), SinkProbe::default()];
        let timers = TimerProbe::default();
        let controller = PlaybackController::new(
            [
                Box::new(FakeSink(sinks[0].clone())),
                Box::new(FakeSink(sinks[1].clone())),
            ],
            Box::new(ManualScheduler(timers.clone())),
            PlaybackConfig::default(),
        )
        .with_preferences(prefs);

        Self {
            controller,
            sinks,
            timers,
        }
    }

    pub fn probe(&self, handle: HandleId) -> &SinkProbe {
        match handle {
            HandleId::A => &self.sinks[0],
            HandleId::B => &self.sinks[1],
        }
    }

    /// Deliver metadata for whatever `handle` has loaded
    pub fn metadata(&mut self, handle: HandleId) {
        {
            let mut s = self.probe(handle).state();
            s.ready = true;
            s.duration = Some(ASSET_LENGTH);
        }
        self.controller
            .handle_sink_event(handle, SinkEvent::MetadataLoaded);
    }

    /// Confirm the last start requested on `handle`
    pub fn accept(&mut self, handle: HandleId) {
        let ticket = self.probe(handle).last_ticket();
        self.controller
            .handle_sink_event(handle, SinkEvent::PlayStarted(ticket));
    }

    /// Refuse the last start requested on `handle`
    pub fn reject(&mut self, handle: HandleId, reason: &str) {
        let ticket = self.probe(handle).last_ticket();
        self.probe(handle).state().paused = true;
        self.controller.handle_sink_event(
            handle,
            SinkEvent::PlayRejected {
                ticket,
                reason: reason.to_string(),
            },
        );
    }

    /// Metadata (if needed) followed by a successful start
    pub fn start(&mut self, handle: HandleId) {
        if !self.probe(handle).state().ready {
            self.metadata(handle);
        }
        self.accept(handle);
    }

    /// Move `handle` to a raw position and report it
    pub fn advance_to(&mut self, handle: HandleId, raw: Duration) {
        self.probe(handle).state().position = raw;
        self.controller
            .handle_sink_event(handle, SinkEvent::TimeUpdate);
    }

    pub fn end(&mut self, handle: HandleId) {
        {
            let mut s = self.probe(handle).state();
            s.position = ASSET_LENGTH;
            s.paused = true;
        }
        self.controller.handle_sink_event(handle, SinkEvent::Ended);
    }

    /// Fire the running crossfade timer `times` times
    pub fn tick(&mut self, times: usize) {
        for _ in 0..times {
            let Some(timer) = self.timers.active().last().copied() else {
                return;
            };
            self.controller.handle_timer(timer);
        }
    }

    /// Play `playlist[index]` and bring it to a running start
    pub fn play_started(&mut self, playlist: &Playlist, index: usize) {
        let track = playlist.get(index).cloned().unwrap();
        let vocal = track.vocals[0].clone();
        self.controller
            .play(track, vocal, playlist.clone(), false)
            .unwrap();
        let handle = self.controller.active_handle();
        self.start(handle);
    }

    pub fn events(&mut self) -> Vec<PlayerEvent> {
        self.controller.drain_events()
    }
}

// ============================================================================
// Catalog fixtures
// ============================================================================

pub fn track(id: u32) -> Arc<Track> {
    Arc::new(
        Track::new(id, format!("Track {id}"), format!("jacket_s_{id:03}"))
            .with_unit("Leo/need")
            .with_vocal(VocalVariant::new(
                VocalKind::Story,
                vec!["星乃一歌".to_string()],
                format!("{id:04}_01"),
            ))
            .with_vocal(VocalVariant::new(
                VocalKind::VirtualSinger,
                vec!["初音ミク".to_string()],
                format!("{id:04}_02"),
            )),
    )
}

pub fn playlist(n: u32) -> Playlist {
    (1..=n).map(track).collect()
}

pub fn secs(s: u64) -> Duration {
    Duration::from_secs(s)
}

pub fn count<F: Fn(&PlayerEvent) -> bool>(events: &[PlayerEvent], pred: F) -> usize {
    events.iter().filter(|e| pred(e)).count()
}
