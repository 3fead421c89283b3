//! Cache storage backends
//!
//! A cache store maps request URLs to response bodies. One store is one
//! cache generation; a new generation name replaces the old one.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use bytes::Bytes;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::Result;

/// Default cache generation name
pub const DEFAULT_CACHE_NAME: &str = "sekai-app-cache-v18";

/// URL-keyed response body storage
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Body stored for `url`, if any
    async fn lookup(&self, url: &str) -> Result<Option<Bytes>>;

    async fn put(&self, url: &str, body: Bytes) -> Result<()>;

    /// All stored URLs
    async fn keys(&self) -> Result<Vec<String>>;

    /// Drop every entry
    async fn clear(&self) -> Result<()>;

    async fn contains(&self, url: &str) -> Result<bool> {
        Ok(self.lookup(url).await?.is_some())
    }
}

/// In-memory store (tests and short-lived sessions)
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    entries: RwLock<HashMap<String, Bytes>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn lookup(&self, url: &str) -> Result<Option<Bytes>> {
        Ok(self.entries.read().await.get(url).cloned())
    }

    async fn put(&self, url: &str, body: Bytes) -> Result<()> {
        self.entries.write().await.insert(url.to_string(), body);
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>> {
        Ok(self.entries.read().await.keys().cloned().collect())
    }

    async fn clear(&self) -> Result<()> {
        self.entries.write().await.clear();
        Ok(())
    }
}

/// Directory store: `<root>/<name>/<encoded url>`
///
/// File names are the URL-safe base64 of the URL, so keys can be listed
/// back without a separate index.
#[derive(Debug, Clone)]
pub struct DiskCacheStore {
    dir: PathBuf,
}

impl DiskCacheStore {
    /// Open generation `name` under `root`, deleting every other generation
    pub async fn open(root: impl AsRef<Path>, name: &str) -> Result<Self> {
        let root = root.as_ref();
        let dir = root.join(name);
        tokio::fs::create_dir_all(&dir).await?;

        let mut entries = tokio::fs::read_dir(root).await?;
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_name() == name || !entry.file_type().await?.is_dir() {
                continue;
            }
            info!(generation = ?entry.file_name(), "Pruning stale cache generation");
            if let Err(e) = tokio::fs::remove_dir_all(entry.path()).await {
                warn!(path = %entry.path().display(), error = %e, "Failed to prune cache generation");
            }
        }

        debug!(dir = %dir.display(), "Opened disk cache");
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, url: &str) -> PathBuf {
        self.dir.join(URL_SAFE_NO_PAD.encode(url))
    }
}

#[async_trait]
impl CacheStore for DiskCacheStore {
    async fn lookup(&self, url: &str) -> Result<Option<Bytes>> {
        match tokio::fs::read(self.path_for(url)).await {
            Ok(body) => Ok(Some(Bytes::from(body))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn put(&self, url: &str, body: Bytes) -> Result<()> {
        let path = self.path_for(url);
        let tmp = path.with_extension("part");
        tokio::fs::write(&tmp, &body).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            let decoded = URL_SAFE_NO_PAD
                .decode(name)
                .ok()
                .and_then(|raw| String::from_utf8(raw).ok());
            match decoded {
                Some(url) => keys.push(url),
                None => debug!(file = name, "Skipping foreign file in cache directory"),
            }
        }
        Ok(keys)
    }

    async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_dir_all(&self.dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        tokio::fs::create_dir_all(&self.dir).await?;
        Ok(())
    }
}
