//! Saved playlists
//!
//! A user keeps at most [`MAX_PLAYLISTS`] named playlists, each an ordered
//! list of track ids without duplicates.

use chrono::Utc;
use sekai_core::TrackId;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, StorageError};
use crate::store::PreferenceStore;

/// Playlists document key
pub const PLAYLISTS_KEY: &str = "sekai_playlists";

/// Maximum number of saved playlists
pub const MAX_PLAYLISTS: usize = 10;

/// Saved playlist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedPlaylist {
    /// Creation timestamp in milliseconds, as a string
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub items: Vec<TrackId>,
}

impl SavedPlaylist {
    pub fn contains(&self, track: TrackId) -> bool {
        self.items.contains(&track)
    }
}

/// All saved playlists, in creation order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaylistBook {
    playlists: Vec<SavedPlaylist>,
}

impl PlaylistBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.playlists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.playlists.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.playlists.len() >= MAX_PLAYLISTS
    }

    pub fn list(&self) -> &[SavedPlaylist] {
        &self.playlists
    }

    pub fn get(&self, id: &str) -> Option<&SavedPlaylist> {
        self.playlists.iter().find(|p| p.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut SavedPlaylist> {
        self.playlists
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| StorageError::not_found("Playlist", id))
    }

    /// Create a playlist
    ///
    /// A blank `name` becomes `Playlist N`. Initial ids that `is_known`
    /// rejects are dropped, as are repeated ids.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::PlaylistLimit`] when [`MAX_PLAYLISTS`] already exist.
    pub fn create<F>(&mut self, name: &str, initial: &[TrackId], is_known: F) -> Result<&SavedPlaylist>
    where
        F: Fn(TrackId) -> bool,
    {
        if self.is_full() {
            return Err(StorageError::PlaylistLimit { max: MAX_PLAYLISTS });
        }

        let name = match name.trim() {
            "" => format!("Playlist {}", self.playlists.len() + 1),
            trimmed => trimmed.to_string(),
        };

        let mut items = Vec::with_capacity(initial.len());
        for &id in initial {
            if is_known(id) && !items.contains(&id) {
                items.push(id);
            }
        }

        let id = self.next_id();
        debug!(id = %id, name = %name, items = items.len(), "Creating playlist");
        self.playlists.push(SavedPlaylist { id, name, items });

        let index = self.playlists.len() - 1;
        Ok(&self.playlists[index])
    }

    fn next_id(&self) -> String {
        let mut stamp = Utc::now().timestamp_millis();
        while self.get(&stamp.to_string()).is_some() {
            stamp += 1;
        }
        stamp.to_string()
    }

    pub fn delete(&mut self, id: &str) -> Result<SavedPlaylist> {
        let index = self
            .playlists
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| StorageError::not_found("Playlist", id))?;
        Ok(self.playlists.remove(index))
    }

    /// Append `track`; returns `false` if it was already present
    pub fn add(&mut self, id: &str, track: TrackId) -> Result<bool> {
        let playlist = self.get_mut(id)?;
        if playlist.contains(track) {
            return Ok(false);
        }
        playlist.items.push(track);
        Ok(true)
    }

    /// Remove `track`; returns `false` if it was not present
    pub fn remove(&mut self, id: &str, track: TrackId) -> Result<bool> {
        let playlist = self.get_mut(id)?;
        let before = playlist.items.len();
        playlist.items.retain(|&t| t != track);
        Ok(playlist.items.len() != before)
    }

    pub fn rename(&mut self, id: &str, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(());
        }
        self.get_mut(id)?.name = name.to_string();
        Ok(())
    }

    /// Track ids joined with commas, for sharing
    pub fn export_ids(&self, id: &str) -> Result<String> {
        let playlist = self
            .get(id)
            .ok_or_else(|| StorageError::not_found("Playlist", id))?;
        Ok(playlist
            .items
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(","))
    }
}

/// Parse a shared id list
///
/// Splits on commas and whitespace and keeps positive integers; anything
/// else is skipped.
///
/// ```rust
/// use sekai_storage::playlists::parse_id_string;
///
/// let ids: Vec<u32> = parse_id_string("1, 74,,x 0 90").iter().map(|id| id.get()).collect();
/// assert_eq!(ids, vec![1, 74, 90]);
/// ```
pub fn parse_id_string(input: &str) -> Vec<TrackId> {
    input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter_map(|part| part.parse::<u32>().ok())
        .filter(|&n| n > 0)
        .map(TrackId::new)
        .collect()
}

pub fn load(store: &PreferenceStore) -> Result<PlaylistBook> {
    store.load_or_default(PLAYLISTS_KEY)
}

pub fn save(store: &PreferenceStore, book: &PlaylistBook) -> Result<()> {
    store.save(PLAYLISTS_KEY, book)
}
