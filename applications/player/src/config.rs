/// Player configuration
use crate::error::{PlayerError, Result};
use sekai_cache::CacheSettings;
use sekai_core::AssetUrls;
use sekai_playback::PlaybackConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "sekai.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlayerConfig {
    #[serde(default = "default_assets")]
    pub assets: AssetSettings,

    #[serde(default = "default_playback")]
    pub playback: PlaybackSettings,

    #[serde(default = "default_cache")]
    pub cache: CacheConfig,

    #[serde(default = "default_storage")]
    pub storage: StorageSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AssetSettings {
    #[serde(default = "default_jacket_base_url")]
    pub jacket_base_url: String,

    #[serde(default = "default_audio_base_url")]
    pub audio_base_url: String,

    /// Catalog feed: an http(s) URL or a local path
    #[serde(default = "default_catalog_url")]
    pub catalog_url: String,

    /// Lyrics feed: an http(s) URL or a local path
    #[serde(default = "default_lyrics_url")]
    pub lyrics_url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlaybackSettings {
    #[serde(default = "default_intro_skip_secs")]
    pub intro_skip_secs: u64,

    #[serde(default = "default_crossfade_steps")]
    pub crossfade_steps: u32,

    #[serde(default = "default_restart_threshold_secs")]
    pub restart_threshold_secs: u64,

    #[serde(default = "default_preload_count")]
    pub preload_count: usize,

    #[serde(default = "default_media_album")]
    pub media_album: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_directory")]
    pub directory: PathBuf,

    /// Cache generation; opening a cache prunes the other generations
    #[serde(default = "default_cache_name")]
    pub name: String,

    #[serde(default = "default_jacket_concurrency")]
    pub jacket_concurrency: usize,

    #[serde(default = "default_audio_concurrency")]
    pub audio_concurrency: usize,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageSettings {
    #[serde(default = "default_storage_directory")]
    pub directory: PathBuf,
}

impl PlayerConfig {
    /// Load configuration from `sekai.toml` (if present) and environment
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(DEFAULT_CONFIG_FILE))
    }

    /// Load configuration from `path` (if present) and environment
    ///
    /// Environment variables use the `SEKAI_` prefix and `__` between
    /// nesting levels, e.g. `SEKAI_CACHE__AUDIO_CONCURRENCY=2`.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut settings = config::Config::builder();

        if path.exists() {
            settings = settings.add_source(config::File::from(path.to_path_buf()));
        }

        settings = settings.add_source(
            config::Environment::with_prefix("SEKAI")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| PlayerError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| PlayerError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.assets.jacket_base_url.trim().is_empty() {
            return Err(PlayerError::Config(
                "assets.jacket_base_url must not be empty".to_string(),
            ));
        }

        if self.assets.audio_base_url.trim().is_empty() {
            return Err(PlayerError::Config(
                "assets.audio_base_url must not be empty".to_string(),
            ));
        }

        if self.playback.crossfade_steps == 0 {
            return Err(PlayerError::Config(
                "playback.crossfade_steps must be at least 1".to_string(),
            ));
        }

        if self.cache.jacket_concurrency == 0 || self.cache.audio_concurrency == 0 {
            return Err(PlayerError::Config(
                "cache concurrency must be at least 1".to_string(),
            ));
        }

        if self.cache.name.trim().is_empty() {
            return Err(PlayerError::Config("cache.name must not be empty".to_string()));
        }

        Ok(())
    }

    pub fn asset_urls(&self) -> AssetUrls {
        AssetUrls::new(&self.assets.jacket_base_url, &self.assets.audio_base_url)
    }

    pub fn playback_config(&self) -> PlaybackConfig {
        PlaybackConfig {
            intro_skip: Duration::from_secs(self.playback.intro_skip_secs),
            crossfade_steps: self.playback.crossfade_steps,
            restart_threshold: Duration::from_secs(self.playback.restart_threshold_secs),
            preload_count: self.playback.preload_count,
            media_album: self.playback.media_album.clone(),
            ..PlaybackConfig::default()
        }
    }

    pub fn cache_settings(&self) -> CacheSettings {
        CacheSettings {
            jacket_concurrency: self.cache.jacket_concurrency,
            audio_concurrency: self.cache.audio_concurrency,
            request_timeout: Duration::from_secs(self.cache.request_timeout_secs),
        }
    }
}

// Default value functions
fn default_assets() -> AssetSettings {
    AssetSettings {
        jacket_base_url: default_jacket_base_url(),
        audio_base_url: default_audio_base_url(),
        catalog_url: default_catalog_url(),
        lyrics_url: default_lyrics_url(),
    }
}

fn default_playback() -> PlaybackSettings {
    PlaybackSettings {
        intro_skip_secs: default_intro_skip_secs(),
        crossfade_steps: default_crossfade_steps(),
        restart_threshold_secs: default_restart_threshold_secs(),
        preload_count: default_preload_count(),
        media_album: default_media_album(),
    }
}

fn default_cache() -> CacheConfig {
    CacheConfig {
        directory: default_cache_directory(),
        name: default_cache_name(),
        jacket_concurrency: default_jacket_concurrency(),
        audio_concurrency: default_audio_concurrency(),
        request_timeout_secs: default_request_timeout_secs(),
    }
}

fn default_storage() -> StorageSettings {
    StorageSettings {
        directory: default_storage_directory(),
    }
}

fn default_jacket_base_url() -> String {
    "https://storage.sekai.best/sekai-jp-assets/music/jacket/".to_string()
}

fn default_audio_base_url() -> String {
    "https://storage.sekai.best/sekai-jp-assets/music/long/".to_string()
}

fn default_catalog_url() -> String {
    "./music.json".to_string()
}

fn default_lyrics_url() -> String {
    "./song-lyrics.json".to_string()
}

fn default_intro_skip_secs() -> u64 {
    9
}

fn default_crossfade_steps() -> u32 {
    20
}

fn default_restart_threshold_secs() -> u64 {
    3
}

fn default_preload_count() -> usize {
    10
}

fn default_media_album() -> String {
    "Project SEKAI".to_string()
}

fn default_cache_directory() -> PathBuf {
    PathBuf::from("./cache")
}

fn default_cache_name() -> String {
    sekai_cache::DEFAULT_CACHE_NAME.to_string()
}

fn default_jacket_concurrency() -> usize {
    10
}

fn default_audio_concurrency() -> usize {
    5
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_storage_directory() -> PathBuf {
    PathBuf::from("./data")
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            assets: default_assets(),
            playback: default_playback(),
            cache: default_cache(),
            storage: default_storage(),
        }
    }
}
