//! SEKAI Player Core
//!
//! Platform-agnostic catalog types and policies shared by every other crate
//! of the player.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Track`, `VocalVariant`, `Lyrics`, `Preferences`
//! - **Catalog Store**: the immutable track list and the filtered view
//! - **Vocal Policy**: which variant to play for a given preference
//! - **Asset Conventions**: artwork and audio URLs derived from asset ids
//! - **Error Handling**: unified `CoreError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use sekai_core::{preferred_vocal, AssetUrls, CatalogStore, VocalPriority};
//!
//! let json = r#"[{
//!     "id": 1,
//!     "title": "Tell Your World",
//!     "assetbundleName": "jacket_s_001",
//!     "unit": ["VIRTUAL SINGER"],
//!     "vocals": [{"type": "バーチャル・シンガーver.", "vo": "初音ミク", "assetbundleName": "0001_01"}]
//! }]"#;
//!
//! let catalog = CatalogStore::from_json(json).unwrap();
//! let track = &catalog.view()[0];
//! let vocal = preferred_vocal(track, VocalPriority::PreferStory).unwrap();
//!
//! let urls = AssetUrls::default();
//! assert!(urls.vocal_audio(vocal).ends_with("0001_01/0001_01.mp3"));
//! ```

#![forbid(unsafe_code)]

pub mod assets;
pub mod catalog;
pub mod error;
pub mod format;
pub mod types;
pub mod vocal;

pub use assets::{is_audio_url, is_jacket_url, AssetUrls};
pub use catalog::{CatalogFilter, CatalogStore, Playlist, SortMode, ViewContext};
pub use error::{CoreError, Result};
pub use format::format_time;
pub use types::{
    Lyrics, LyricsEntry, Preferences, Theme, Track, TrackId, VocalKind, VocalPriority,
    VocalVariant,
};
pub use vocal::preferred_vocal;
