//! Typed access to the key-value backend

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::error::Result;
use crate::kv::{KeyValueStore, MemoryStore};

/// JSON documents stored under string keys
///
/// Cheap to clone; all clones share the same backend.
#[derive(Clone)]
pub struct PreferenceStore {
    backend: Arc<dyn KeyValueStore>,
}

impl PreferenceStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// Store backed by memory only
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Load the document under `key`, or `T::default()` when absent
    ///
    /// A document that no longer parses is treated as absent and logged,
    /// so a corrupted key never blocks startup. Backend failures still
    /// propagate.
    pub fn load_or_default<T>(&self, key: &str) -> Result<T>
    where
        T: DeserializeOwned + Default,
    {
        let Some(raw) = self.backend.get(key)? else {
            return Ok(T::default());
        };
        if raw.trim().is_empty() {
            return Ok(T::default());
        }

        match serde_json::from_str(&raw) {
            Ok(value) => Ok(value),
            Err(e) => {
                warn!(key, error = %e, "Discarding malformed stored value");
                Ok(T::default())
            }
        }
    }

    /// Load the document under `key`, failing on malformed JSON
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.backend.get(key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.backend.set(key, &raw)
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        self.backend.remove(key)
    }
}

impl std::fmt::Debug for PreferenceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreferenceStore").finish_non_exhaustive()
    }
}
