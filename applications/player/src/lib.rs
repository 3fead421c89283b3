//! SEKAI player composition root
//!
//! Configuration, feed loading and the [`Player`] facade that wires the
//! catalog, persisted state, playback controller and offline asset cache
//! together. The `sekai-player` binary uses the same pieces to warm the
//! offline cache in the background.

pub mod app;
pub mod config;
pub mod error;
pub mod feeds;

pub use app::{Player, PlayerParts};
pub use config::PlayerConfig;
pub use error::{PlayerError, Result};
pub use feeds::FeedLoader;
