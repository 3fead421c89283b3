//! Asset URL conventions
//!
//! Artwork and audio URLs are derived from asset identifiers with a fixed
//! base URL + path template:
//!
//! - jacket: `{jacket_base}{asset}/{asset}.png`
//! - audio:  `{audio_base}{asset}/{asset}.mp3`

use serde::{Deserialize, Serialize};

use crate::types::{Track, VocalVariant};

/// Default base URL for jacket artwork
pub const DEFAULT_JACKET_BASE_URL: &str =
    "https://storage.sekai.best/sekai-jp-assets/music/jacket/";

/// Default base URL for full-length audio
pub const DEFAULT_AUDIO_BASE_URL: &str = "https://storage.sekai.best/sekai-jp-assets/music/long/";

/// Path segment identifying jacket artwork URLs
pub const JACKET_SEGMENT: &str = "/jacket/";

/// Path segment identifying full-length audio URLs
pub const AUDIO_SEGMENT: &str = "/long/";

/// Base URLs for asset derivation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetUrls {
    jacket_base: String,
    audio_base: String,
}

impl AssetUrls {
    /// Create from base URLs; a trailing slash is added when missing
    pub fn new(jacket_base: impl Into<String>, audio_base: impl Into<String>) -> Self {
        Self {
            jacket_base: with_trailing_slash(jacket_base.into()),
            audio_base: with_trailing_slash(audio_base.into()),
        }
    }

    /// Jacket artwork URL for an asset identifier
    pub fn jacket_url(&self, asset: &str) -> String {
        format!("{}{asset}/{asset}.png", self.jacket_base)
    }

    /// Audio URL for an asset identifier
    pub fn audio_url(&self, asset: &str) -> String {
        format!("{}{asset}/{asset}.mp3", self.audio_base)
    }

    /// Jacket artwork URL for a track
    pub fn track_jacket(&self, track: &Track) -> String {
        self.jacket_url(&track.asset)
    }

    /// Audio URL for a vocal variant
    pub fn vocal_audio(&self, vocal: &VocalVariant) -> String {
        self.audio_url(&vocal.asset)
    }

    /// Normalized jacket base URL
    pub fn jacket_base(&self) -> &str {
        &self.jacket_base
    }

    /// Normalized audio base URL
    pub fn audio_base(&self) -> &str {
        &self.audio_base
    }
}

impl Default for AssetUrls {
    fn default() -> Self {
        Self::new(DEFAULT_JACKET_BASE_URL, DEFAULT_AUDIO_BASE_URL)
    }
}

/// Whether a URL points at jacket artwork
pub fn is_jacket_url(url: &str) -> bool {
    url.contains(JACKET_SEGMENT)
}

/// Whether a URL points at full-length audio
pub fn is_audio_url(url: &str) -> bool {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.contains(AUDIO_SEGMENT) && path.ends_with(".mp3")
}

fn with_trailing_slash(mut base: String) -> String {
    if !base.ends_with('/') {
        base.push('/');
    }
    base
}
