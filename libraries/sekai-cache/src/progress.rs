//! Bulk caching progress reporting

use serde::{Deserialize, Serialize};

/// Asset kind handled by a bulk run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Jacket,
    Audio,
}

/// Progress of a bulk run, reported after every asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheProgress {
    /// Assets processed so far
    pub current: usize,
    pub total: usize,
    /// Newly stored
    pub cached: usize,
    /// Already present or being fetched elsewhere
    pub skipped: usize,
    pub kind: AssetKind,
}

impl CacheProgress {
    pub fn new(kind: AssetKind, total: usize) -> Self {
        Self {
            current: 0,
            total,
            cached: 0,
            skipped: 0,
            kind,
        }
    }

    /// Failed assets: processed but neither cached nor skipped
    pub fn failed(&self) -> usize {
        self.current - self.cached - self.skipped
    }

    pub fn summary(&self) -> CacheSummary {
        CacheSummary {
            total: self.total,
            cached: self.cached,
            skipped: self.skipped,
        }
    }
}

/// Result of a completed bulk run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CacheSummary {
    pub total: usize,
    pub cached: usize,
    pub skipped: usize,
}

/// Result of a completed jackets-then-audio run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CacheAllSummary {
    pub jackets: CacheSummary,
    pub audio: CacheSummary,
}

/// Number of cached entries by kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CachedCount {
    pub jackets: usize,
    pub audio: usize,
    /// All entries, including ones of neither kind
    pub total: usize,
}
