//! Offline asset cache for the SEKAI player.
//!
//! This crate provides:
//! - Background prefetch of upcoming tracks (the playback controller's
//!   [`sekai_playback::AssetPreloader`])
//! - Bulk "cache every jacket / every track" runs with bounded
//!   concurrency, progress reporting and abort
//! - Offline fetch routing: jackets and audio cache-first, everything else
//!   network-first
//! - Memory and disk cache stores, one directory per cache generation
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use sekai_cache::{AssetCache, CacheSettings, DiskCacheStore, DEFAULT_CACHE_NAME};
//! use sekai_core::AssetUrls;
//!
//! let store = DiskCacheStore::open("./cache", DEFAULT_CACHE_NAME).await?;
//! let cache = AssetCache::new(AssetUrls::default(), Some(Arc::new(store)), CacheSettings::default())?;
//!
//! let summary = cache
//!     .cache_all(catalog.tracks(), |p| println!("{}/{}", p.current, p.total))
//!     .await?;
//! ```

mod cache;
mod error;
mod progress;
mod routing;
mod store;

pub use cache::{AssetCache, CacheSettings};
pub use error::{CacheError, Result};
pub use progress::{AssetKind, CacheAllSummary, CacheProgress, CacheSummary, CachedCount};
pub use routing::{route_for, Route};
pub use store::{CacheStore, DiskCacheStore, MemoryCacheStore, DEFAULT_CACHE_NAME};
