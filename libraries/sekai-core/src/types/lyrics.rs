/// Lyrics feed types
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::TrackId;
use crate::error::Result;

/// One entry of the lyrics feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LyricsEntry {
    /// Track the lyrics belong to
    pub id: TrackId,

    /// Ordered lyric lines
    #[serde(rename = "fullLyrics", default)]
    pub lines: Vec<String>,
}

/// Lyrics indexed by track
///
/// A missing entry is not an error; the feature is simply unavailable
/// for that track.
#[derive(Debug, Clone, Default)]
pub struct Lyrics {
    by_track: HashMap<TrackId, Vec<String>>,
}

impl Lyrics {
    /// Build from feed entries; later duplicates win
    pub fn new(entries: Vec<LyricsEntry>) -> Self {
        let by_track = entries
            .into_iter()
            .map(|entry| (entry.id, entry.lines))
            .collect();
        Self { by_track }
    }

    /// Parse the lyrics feed document
    pub fn from_json(json: &str) -> Result<Self> {
        let entries: Vec<LyricsEntry> = serde_json::from_str(json)?;
        Ok(Self::new(entries))
    }

    /// Lines for a track, if any were published
    pub fn get(&self, id: TrackId) -> Option<&[String]> {
        self.by_track
            .get(&id)
            .filter(|lines| !lines.is_empty())
            .map(Vec::as_slice)
    }

    /// Number of tracks with an entry
    pub fn len(&self) -> usize {
        self.by_track.len()
    }

    /// Whether the feed was empty or unavailable
    pub fn is_empty(&self) -> bool {
        self.by_track.is_empty()
    }
}
