//! Playback session
//!
//! The in-memory state of what is playing: current track and variant, the
//! playlist snapshot taken when playback started, the position in it, and
//! the shuffle/repeat/volume/playing flags. Never persisted.

use std::sync::Arc;

use rand::Rng;
use sekai_core::{Playlist, Track, VocalVariant};

use crate::volume::Volume;

/// Track and variant currently loaded on the active handle
#[derive(Debug, Clone)]
pub struct CurrentTrack {
    pub track: Arc<Track>,
    pub vocal: VocalVariant,
}

/// Playback session
#[derive(Debug, Clone, Default)]
pub struct PlaybackSession {
    pub(crate) current: Option<CurrentTrack>,
    pub(crate) playlist: Playlist,
    pub(crate) index: Option<usize>,
    pub(crate) shuffle: bool,
    pub(crate) repeat: bool,
    pub(crate) volume: Volume,
    pub(crate) playing: bool,
}

impl PlaybackSession {
    pub fn new(volume: Volume) -> Self {
        Self {
            volume,
            ..Self::default()
        }
    }

    pub fn current(&self) -> Option<&CurrentTrack> {
        self.current.as_ref()
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    /// Index of the current track in the playlist, if it is part of it
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn is_shuffle(&self) -> bool {
        self.shuffle
    }

    pub fn is_repeat(&self) -> bool {
        self.repeat
    }

    pub fn volume(&self) -> &Volume {
        &self.volume
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Make `track` current and locate it in the playlist
    pub(crate) fn set_current(&mut self, track: Arc<Track>, vocal: VocalVariant) {
        self.index = self.playlist.position(track.id);
        self.current = Some(CurrentTrack { track, vocal });
    }

    /// Index the next call should play
    ///
    /// With shuffle on any index may come up, the current one included.
    pub fn next_index<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<usize> {
        let len = self.playlist.len();
        if len == 0 {
            return None;
        }
        if self.shuffle {
            return Some(rng.gen_range(0..len));
        }
        Some(self.index.map_or(0, |i| (i + 1) % len))
    }

    /// Index the previous call should play
    pub fn prev_index<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<usize> {
        let len = self.playlist.len();
        if len == 0 {
            return None;
        }
        if self.shuffle {
            return Some(rng.gen_range(0..len));
        }
        Some(self.index.map_or(len - 1, |i| (i + len - 1) % len))
    }
}
