//! SEKAI Player Storage
//!
//! Persisted local state for the player: settings, theme, saved playlists,
//! favorites and play statistics. Every slice is one JSON document stored
//! under a fixed key in a [`KeyValueStore`].
//!
//! # Architecture
//!
//! - **Backends**: [`MemoryStore`] and the directory-backed [`FileStore`]
//! - **Typed access**: [`PreferenceStore`] (de)serializes documents and
//!   falls back to defaults when a stored document is malformed
//! - **Vertical slices**: each module owns its key, its document type and
//!   its operations
//!
//! # Example
//!
//! ```rust
//! use sekai_storage::{favorites, stats, PreferenceStore};
//! use sekai_core::TrackId;
//!
//! let store = PreferenceStore::in_memory();
//! favorites::toggle(&store, TrackId::new(74))?;
//! stats::record_play(&store, TrackId::new(74))?;
//!
//! assert!(favorites::load(&store)?.contains(TrackId::new(74)));
//! # Ok::<(), sekai_storage::StorageError>(())
//! ```

mod error;
mod kv;
mod store;

// Vertical slices
pub mod favorites;
pub mod playlists;
pub mod settings;
pub mod stats;

pub use error::{Result, StorageError};
pub use favorites::Favorites;
pub use kv::{FileStore, KeyValueStore, MemoryStore};
pub use playlists::{PlaylistBook, SavedPlaylist, MAX_PLAYLISTS};
pub use stats::{PlayStats, RankedTrack};
pub use store::PreferenceStore;
