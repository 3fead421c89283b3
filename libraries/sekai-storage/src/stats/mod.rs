//! Play history and play counts

use std::collections::HashMap;

use sekai_core::TrackId;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::store::PreferenceStore;

/// Stats document key
pub const STATS_KEY: &str = "sekai_stats";

/// Longest history kept
pub const HISTORY_LIMIT: usize = 100;

/// Rows shown by default in history and ranking views
pub const DEFAULT_DISPLAY_LIMIT: usize = 50;

/// Play statistics
///
/// Ids are kept as strings, matching the stored document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayStats {
    /// Most recent first, no duplicates
    #[serde(default)]
    pub history: Vec<String>,
    #[serde(default)]
    pub play_counts: HashMap<String, u64>,
}

/// One ranking row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedTrack {
    pub id: TrackId,
    pub plays: u64,
}

impl PlayStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a play and move the track to the front of the history
    pub fn record_play(&mut self, id: TrackId) {
        let key = id.to_string();
        *self.play_counts.entry(key.clone()).or_insert(0) += 1;

        self.history.retain(|h| *h != key);
        self.history.insert(0, key);
        self.history.truncate(HISTORY_LIMIT);
    }

    pub fn play_count(&self, id: TrackId) -> u64 {
        self.play_counts.get(&id.to_string()).copied().unwrap_or(0)
    }

    /// Recently played ids, most recent first
    pub fn history(&self, limit: usize) -> Vec<TrackId> {
        self.history
            .iter()
            .filter_map(|h| h.parse().ok())
            .take(limit)
            .collect()
    }

    /// Most played ids, ties broken by ascending id
    pub fn ranking(&self, limit: usize) -> Vec<RankedTrack> {
        let mut rows: Vec<RankedTrack> = self
            .play_counts
            .iter()
            .filter(|(_, plays)| **plays > 0)
            .filter_map(|(id, plays)| {
                Some(RankedTrack {
                    id: id.parse().ok()?,
                    plays: *plays,
                })
            })
            .collect();
        rows.sort_by(|a, b| b.plays.cmp(&a.plays).then(a.id.cmp(&b.id)));
        rows.truncate(limit);
        rows
    }
}

pub fn load(store: &PreferenceStore) -> Result<PlayStats> {
    store.load_or_default(STATS_KEY)
}

pub fn save(store: &PreferenceStore, stats: &PlayStats) -> Result<()> {
    store.save(STATS_KEY, stats)
}

/// Record a play in the stored statistics
pub fn record_play(store: &PreferenceStore, id: TrackId) -> Result<PlayStats> {
    let mut stats = load(store)?;
    stats.record_play(id);
    save(store, &stats)?;
    Ok(stats)
}
