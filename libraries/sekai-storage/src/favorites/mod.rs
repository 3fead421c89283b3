//! Favorite tracks

use sekai_core::TrackId;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::store::PreferenceStore;

/// Favorites document key
pub const FAVORITES_KEY: &str = "sekai_favorites";

/// Favorite track ids in the order they were added
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Favorites {
    ids: Vec<TrackId>,
}

impl Favorites {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: TrackId) -> bool {
        self.ids.contains(&id)
    }

    /// Add or remove `id`; returns whether it is now a favorite
    pub fn toggle(&mut self, id: TrackId) -> bool {
        if let Some(index) = self.ids.iter().position(|&f| f == id) {
            self.ids.remove(index);
            false
        } else {
            self.ids.push(id);
            true
        }
    }

    pub fn list(&self) -> &[TrackId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

pub fn load(store: &PreferenceStore) -> Result<Favorites> {
    store.load_or_default(FAVORITES_KEY)
}

pub fn save(store: &PreferenceStore, favorites: &Favorites) -> Result<()> {
    store.save(FAVORITES_KEY, favorites)
}

/// Toggle `id` in the stored favorites
pub fn toggle(store: &PreferenceStore, id: TrackId) -> Result<bool> {
    let mut favorites = load(store)?;
    let now_favorite = favorites.toggle(id);
    save(store, &favorites)?;
    Ok(now_favorite)
}
