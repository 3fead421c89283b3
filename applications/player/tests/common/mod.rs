//! Shared fixtures for player tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use sekai_cache::AssetCache;
use sekai_core::{CatalogStore, Lyrics};
use sekai_player::{Player, PlayerConfig, PlayerParts};
use sekai_playback::{AudioSink, HandleId, PlayTicket, Scheduler, SinkEvent, TimerId};
use sekai_storage::PreferenceStore;

pub const CATALOG: &str = r#"[
    {
        "id": 1,
        "title": "Tell Your World",
        "composer": "kz",
        "assetbundleName": "jacket_s_001",
        "unit": ["VIRTUAL SINGER"],
        "vocals": [
            {"type": "バーチャル・シンガーver.", "vo": "初音ミク", "assetbundleName": "0001_01"}
        ]
    },
    {
        "id": 74,
        "title": "needLe",
        "composer": "DECO*27",
        "assetbundleName": "jacket_s_074",
        "unit": ["Leo/need"],
        "vocals": [
            {"type": "セカイver.", "vo": "星乃一歌、初音ミク", "assetbundleName": "0074_01"},
            {"type": "バーチャル・シンガーver.", "vo": "初音ミク", "assetbundleName": "0074_02"}
        ],
        "isNewlyWrittenMusic": true
    },
    {
        "id": 90,
        "title": "Ready Steady",
        "assetbundleName": "jacket_s_090",
        "unit": ["Leo/need"],
        "vocals": [
            {"type": "セカイver.", "vo": "星乃一歌", "assetbundleName": "0090_01"}
        ]
    }
]"#;

pub const LYRICS: &str = r#"[{"id": 74, "fullLyrics": ["first line", "second line"]}]"#;

/// Raw length of every stub asset
pub const ASSET_LENGTH: Duration = Duration::from_secs(189);

#[derive(Debug, Default)]
pub struct SinkState {
    pub source: Option<String>,
    pub loads: Vec<String>,
    pub tickets: Vec<PlayTicket>,
    pub position: Duration,
    pub ready: bool,
    pub paused: bool,
    pub gain: f32,
    pub muted: bool,
}

#[derive(Debug, Clone, Default)]
pub struct SinkProbe(Arc<Mutex<SinkState>>);

impl SinkProbe {
    pub fn state(&self) -> MutexGuard<'_, SinkState> {
        self.0.lock().unwrap()
    }
}

/// Media element stand-in that only records what it was asked to do
pub struct StubSink(SinkProbe);

impl AudioSink for StubSink {
    fn load(&mut self, url: &str) {
        let mut s = self.0.state();
        s.source = Some(url.to_string());
        s.loads.push(url.to_string());
        s.position = Duration::ZERO;
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
        self.0.state().position = position;
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
        self.0.state().ready.then_some(ASSET_LENGTH)
    }

    fn is_paused(&self) -> bool {
        self.0.state().paused
    }

    fn is_ready(&self) -> bool {
        self.0.state().ready
    }
}

/// Scheduler whose timers never fire on their own
#[derive(Default)]
pub struct IdleScheduler {
    next: u64,
}

impl Scheduler for IdleScheduler {
    fn start_interval(&mut self, _period: Duration) -> TimerId {
        self.next += 1;
        TimerId(self.next)
    }

    fn cancel(&mut self, _id: TimerId) {}
}

pub struct Fixture {
    pub player: Player,
    pub sinks: [SinkProbe; 2],
    pub store: PreferenceStore,
}

impl Fixture {
    pub fn new() -> Self {
        Self::build(PreferenceStore::in_memory(), &PlayerConfig::default(), None)
    }

    pub fn with_store(store: PreferenceStore) -> Self {
        Self::build(store, &PlayerConfig::default(), None)
    }

    pub fn build(store: PreferenceStore, config: &PlayerConfig, cache: Option<AssetCache>) -> Self {
        let sinks = [SinkProbe::default(), SinkProbe::default()];
        let parts = PlayerParts {
            catalog: CatalogStore::from_json(CATALOG).unwrap(),
            lyrics: Lyrics::from_json(LYRICS).unwrap(),
            store: store.clone(),
            cache,
        };
        let player = Player::new(
            config,
            [
                Box::new(StubSink(sinks[0].clone())),
                Box::new(StubSink(sinks[1].clone())),
            ],
            Box::new(IdleScheduler::default()),
            parts,
        )
        .unwrap();

        Self {
            player,
            sinks,
            store,
        }
    }

    pub fn probe(&self, handle: HandleId) -> &SinkProbe {
        match handle {
            HandleId::A => &self.sinks[0],
            HandleId::B => &self.sinks[1],
        }
    }

    /// Deliver metadata and confirm the start on the active handle
    pub fn start_active(&mut self) {
        let handle = self.player.controller().active_handle();
        self.probe(handle).state().ready = true;
        self.player
            .handle_sink_event(handle, SinkEvent::MetadataLoaded);
        let ticket = *self.probe(handle).state().tickets.last().unwrap();
        self.player
            .handle_sink_event(handle, SinkEvent::PlayStarted(ticket));
    }
}
