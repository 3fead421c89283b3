//! Background asset cache
//!
//! Prefetches upcoming tracks for the playback controller, runs the
//! user-triggered "cache everything" jobs and serves fetches through the
//! offline routing rules.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use bytes::Bytes;
use futures_util::stream::{self, StreamExt};
use reqwest::{Client, StatusCode};
use sekai_core::{is_audio_url, is_jacket_url, AssetUrls, Track};
use sekai_playback::AssetPreloader;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{CacheError, Result};
use crate::progress::{
    AssetKind, CacheAllSummary, CacheProgress, CacheSummary, CachedCount,
};
use crate::routing::{route_for, Route};
use crate::store::CacheStore;

/// Tunables of the asset cache
#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub jacket_concurrency: usize,
    pub audio_concurrency: usize,
    pub request_timeout: Duration,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            jacket_concurrency: 10,
            audio_concurrency: 5,
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Per-asset outcome of a bulk run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Cached,
    Skipped,
    Failed,
    Aborted,
}

/// Marks a URL as being fetched until dropped
struct InFlight {
    set: Arc<Mutex<HashSet<String>>>,
    url: String,
}

impl InFlight {
    /// Claim `url`; `None` when someone else is already fetching it
    fn claim(set: &Arc<Mutex<HashSet<String>>>, url: &str) -> Option<Self> {
        let mut guard = set.lock().unwrap_or_else(PoisonError::into_inner);
        if !guard.insert(url.to_string()) {
            return None;
        }
        Some(Self {
            set: Arc::clone(set),
            url: url.to_string(),
        })
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.set
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.url);
    }
}

struct Inner {
    http: Client,
    store: Option<Arc<dyn CacheStore>>,
    urls: AssetUrls,
    asset_host: String,
    settings: CacheSettings,
    in_flight: Arc<Mutex<HashSet<String>>>,
    active_run: Mutex<Option<ActiveRun>>,
    next_run: AtomicU64,
}

struct ActiveRun {
    id: u64,
    token: CancellationToken,
}

/// Offline asset cache
///
/// Cheap to clone; clones share storage, in-flight set and the active
/// bulk run. Without a store (no cache storage in this environment)
/// preloads are skipped and bulk runs fail with [`CacheError::Unsupported`].
#[derive(Clone)]
pub struct AssetCache {
    inner: Arc<Inner>,
}

impl AssetCache {
    /// Create a cache for assets under `urls`
    pub fn new(
        urls: AssetUrls,
        store: Option<Arc<dyn CacheStore>>,
        settings: CacheSettings,
    ) -> Result<Self> {
        let asset_host = Url::parse(urls.jacket_base())
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .ok_or_else(|| CacheError::InvalidUrl(urls.jacket_base().to_string()))?;

        let http = Client::builder()
            .timeout(settings.request_timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("SekaiPlayer/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(Inner {
                http,
                store,
                urls,
                asset_host,
                settings,
                in_flight: Arc::new(Mutex::new(HashSet::new())),
                active_run: Mutex::new(None),
                next_run: AtomicU64::new(0),
            }),
        })
    }

    /// Whether cache storage is available
    pub fn is_supported(&self) -> bool {
        self.inner.store.is_some()
    }

    /// Whether a bulk run is active
    pub fn is_running(&self) -> bool {
        self.run_slot().is_some()
    }

    fn run_slot(&self) -> MutexGuard<'_, Option<ActiveRun>> {
        self.inner
            .active_run
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn store(&self) -> Result<&Arc<dyn CacheStore>> {
        self.inner.store.as_ref().ok_or(CacheError::Unsupported)
    }

    // ===== Preload =====

    /// Fetch and store `urls` in the background
    ///
    /// Never fails: URLs already cached or in flight are skipped and
    /// per-URL failures are logged. Does nothing outside a Tokio runtime
    /// or without cache storage.
    pub fn spawn_preload(&self, urls: Vec<String>) {
        if urls.is_empty() || !self.is_supported() {
            return;
        }
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            debug!(count = urls.len(), "No runtime, skipping preload");
            return;
        };

        debug!(count = urls.len(), "Preloading assets");
        let cache = self.clone();
        runtime.spawn(async move {
            for url in urls {
                cache.preload_one(url).await;
            }
        });
    }

    async fn preload_one(&self, url: String) {
        let key = self.storage_key(&url);
        let Some(claim) = InFlight::claim(&self.inner.in_flight, &key) else {
            return;
        };
        let Ok(store) = self.store() else {
            return;
        };
        match store.contains(&key).await {
            Ok(true) => {
                debug!(url = %key, "Already cached, skipping");
                return;
            }
            Ok(false) => {}
            Err(e) => {
                warn!(url = %key, error = %e, "Cache lookup failed");
                return;
            }
        }

        let store = Arc::clone(store);
        let http = self.inner.http.clone();
        tokio::spawn(async move {
            let _claim = claim;
            match download(&http, &url).await {
                Ok(body) => match store.put(&key, body).await {
                    Ok(()) => debug!(url = %key, "Cached"),
                    Err(e) => warn!(url = %key, error = %e, "Failed to store preloaded asset"),
                },
                Err(e) => warn!(url = %url, error = %e, "Preload fetch failed"),
            }
        });
    }

    /// Key an asset is stored under: jackets drop their query string
    fn storage_key(&self, url: &str) -> String {
        match Url::parse(url)
            .ok()
            .and_then(|parsed| route_for(&parsed, &self.inner.asset_host))
        {
            Some(Route::Jacket { key }) => key,
            _ => url.to_string(),
        }
    }

    // ===== Bulk runs =====

    /// Cache every track jacket
    ///
    /// Returns `None` when the run was aborted.
    pub async fn cache_all_jackets<F>(
        &self,
        tracks: &[Arc<Track>],
        on_progress: F,
    ) -> Result<Option<CacheSummary>>
    where
        F: FnMut(&CacheProgress),
    {
        let run = self.begin_run(tracks)?;
        let result = self.run_jackets(tracks, &run.token, on_progress).await;
        drop(run);
        Ok(result)
    }

    /// Cache every vocal variant of every track
    pub async fn cache_all_audio<F>(
        &self,
        tracks: &[Arc<Track>],
        on_progress: F,
    ) -> Result<Option<CacheSummary>>
    where
        F: FnMut(&CacheProgress),
    {
        let run = self.begin_run(tracks)?;
        let result = self.run_audio(tracks, &run.token, on_progress).await;
        drop(run);
        Ok(result)
    }

    /// Cache all jackets, then all audio
    pub async fn cache_all<F>(
        &self,
        tracks: &[Arc<Track>],
        mut on_progress: F,
    ) -> Result<Option<CacheAllSummary>>
    where
        F: FnMut(&CacheProgress),
    {
        let run = self.begin_run(tracks)?;
        let Some(jackets) = self.run_jackets(tracks, &run.token, &mut on_progress).await else {
            return Ok(None);
        };
        let Some(audio) = self.run_audio(tracks, &run.token, &mut on_progress).await else {
            return Ok(None);
        };
        Ok(Some(CacheAllSummary { jackets, audio }))
    }

    /// Cancel the active bulk run; returns whether one was running
    pub fn abort(&self) -> bool {
        match self.run_slot().take() {
            Some(run) => {
                run.token.cancel();
                info!("Caching aborted by user");
                true
            }
            None => false,
        }
    }

    fn begin_run(&self, tracks: &[Arc<Track>]) -> Result<RunGuard<'_>> {
        if tracks.is_empty() {
            return Err(CacheError::EmptyCatalog);
        }
        self.store()?;

        let mut slot = self.run_slot();
        if slot.is_some() {
            return Err(CacheError::AlreadyRunning);
        }
        let id = self.inner.next_run.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();
        *slot = Some(ActiveRun {
            id,
            token: token.clone(),
        });
        Ok(RunGuard {
            cache: self,
            id,
            token,
        })
    }

    async fn run_jackets<F>(
        &self,
        tracks: &[Arc<Track>],
        token: &CancellationToken,
        on_progress: F,
    ) -> Option<CacheSummary>
    where
        F: FnMut(&CacheProgress),
    {
        let urls = unique(tracks.iter().map(|t| self.inner.urls.track_jacket(t)));
        info!(count = urls.len(), "Caching jackets");
        self.run(
            AssetKind::Jacket,
            urls,
            self.inner.settings.jacket_concurrency,
            token,
            on_progress,
        )
        .await
    }

    async fn run_audio<F>(
        &self,
        tracks: &[Arc<Track>],
        token: &CancellationToken,
        on_progress: F,
    ) -> Option<CacheSummary>
    where
        F: FnMut(&CacheProgress),
    {
        let urls = unique(
            tracks
                .iter()
                .flat_map(|t| t.vocals.iter())
                .map(|v| self.inner.urls.vocal_audio(v)),
        );
        info!(count = urls.len(), "Caching audio");
        self.run(
            AssetKind::Audio,
            urls,
            self.inner.settings.audio_concurrency,
            token,
            on_progress,
        )
        .await
    }

    async fn run<F>(
        &self,
        kind: AssetKind,
        urls: Vec<String>,
        concurrency: usize,
        token: &CancellationToken,
        mut on_progress: F,
    ) -> Option<CacheSummary>
    where
        F: FnMut(&CacheProgress),
    {
        let mut progress = CacheProgress::new(kind, urls.len());
        let mut outcomes = stream::iter(urls)
            .map(|url| self.cache_one(url, kind, token))
            .buffer_unordered(concurrency.max(1));

        while let Some(outcome) = outcomes.next().await {
            match outcome {
                Outcome::Aborted => continue,
                Outcome::Cached => progress.cached += 1,
                Outcome::Skipped => progress.skipped += 1,
                Outcome::Failed => {}
            }
            progress.current += 1;
            on_progress(&progress);
        }

        if token.is_cancelled() {
            return None;
        }
        info!(
            kind = ?kind,
            total = progress.total,
            cached = progress.cached,
            skipped = progress.skipped,
            failed = progress.failed(),
            "Caching finished"
        );
        Some(progress.summary())
    }

    async fn cache_one(&self, url: String, kind: AssetKind, token: &CancellationToken) -> Outcome {
        if token.is_cancelled() {
            return Outcome::Aborted;
        }
        let Ok(store) = self.store() else {
            return Outcome::Failed;
        };

        // audio preloads share the in-flight set; jackets only come from here
        let _claim = match kind {
            AssetKind::Audio => match InFlight::claim(&self.inner.in_flight, &url) {
                Some(claim) => Some(claim),
                None => return Outcome::Skipped,
            },
            AssetKind::Jacket => None,
        };

        if store.contains(&url).await.unwrap_or(false) {
            return Outcome::Skipped;
        }

        let fetched = tokio::select! {
            () = token.cancelled() => return Outcome::Aborted,
            fetched = download(&self.inner.http, &url) => fetched,
        };

        match fetched {
            Ok(body) => match store.put(&url, body).await {
                Ok(()) => Outcome::Cached,
                Err(e) => {
                    warn!(url = %url, error = %e, "Failed to store asset");
                    Outcome::Failed
                }
            },
            Err(e) => {
                warn!(url = %url, kind = ?kind, error = %e, "Failed to cache asset");
                Outcome::Failed
            }
        }
    }

    // ===== Maintenance =====

    /// Drop every cached entry
    pub async fn clear(&self) -> Result<()> {
        self.store()?.clear().await?;
        info!("Cache cleared");
        Ok(())
    }

    /// Count cached entries by kind; zero when storage is unavailable
    pub async fn cached_count(&self) -> CachedCount {
        let Ok(store) = self.store() else {
            return CachedCount::default();
        };
        match store.keys().await {
            Ok(keys) => CachedCount {
                jackets: keys.iter().filter(|k| is_jacket_url(k)).count(),
                audio: keys
                    .iter()
                    .filter(|k| !is_jacket_url(k) && is_audio_url(k))
                    .count(),
                total: keys.len(),
            },
            Err(e) => {
                warn!(error = %e, "Failed to list cache entries");
                CachedCount::default()
            }
        }
    }

    // ===== Offline fetch =====

    /// Serve `url` through the offline routing rules
    pub async fn fetch(&self, url: &str) -> Result<Bytes> {
        let parsed = Url::parse(url).map_err(|_| CacheError::InvalidUrl(url.to_string()))?;
        let route = route_for(&parsed, &self.inner.asset_host)
            .ok_or_else(|| CacheError::InvalidUrl(url.to_string()))?;
        let store = self.inner.store.as_ref();

        match route {
            Route::Jacket { key } => {
                if let Some(body) = lookup(store, &key).await {
                    return Ok(body);
                }
                let body = download(&self.inner.http, url).await?;
                if let Some(store) = store {
                    if let Err(e) = store.put(&key, body.clone()).await {
                        warn!(url = %key, error = %e, "Failed to store jacket");
                    }
                }
                Ok(body)
            }
            Route::Audio => {
                if let Some(body) = lookup(store, url).await {
                    return Ok(body);
                }
                download(&self.inner.http, url).await
            }
            Route::NetworkFirst => match download(&self.inner.http, url).await {
                Ok(body) => Ok(body),
                Err(e) => {
                    debug!(url = %url, error = %e, "Network failed, trying cache");
                    lookup(store, url)
                        .await
                        .ok_or_else(|| CacheError::Unavailable(url.to_string()))
                }
            },
        }
    }
}

impl AssetPreloader for AssetCache {
    fn preload(&self, urls: Vec<String>) {
        let assets: Vec<String> = urls
            .into_iter()
            .filter(|u| is_audio_url(u) || is_jacket_url(u))
            .collect();
        self.spawn_preload(assets);
    }
}

impl std::fmt::Debug for AssetCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetCache")
            .field("asset_host", &self.inner.asset_host)
            .field("supported", &self.is_supported())
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

/// Clears the active-run slot when a bulk run ends, however it ends
struct RunGuard<'a> {
    cache: &'a AssetCache,
    id: u64,
    token: CancellationToken,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        let mut slot = self.cache.run_slot();
        // after an abort the slot may already belong to a newer run
        if slot.as_ref().is_some_and(|run| run.id == self.id) {
            *slot = None;
        }
    }
}

async fn lookup(store: Option<&Arc<dyn CacheStore>>, url: &str) -> Option<Bytes> {
    let store = store?;
    match store.lookup(url).await {
        Ok(body) => body,
        Err(e) => {
            warn!(url = %url, error = %e, "Cache lookup failed");
            None
        }
    }
}

async fn download(http: &Client, url: &str) -> Result<Bytes> {
    let response = http.get(url).send().await?;
    let status = response.status();
    if status != StatusCode::OK {
        return Err(CacheError::status(status, url));
    }
    Ok(response.bytes().await?)
}

/// Deduplicate while keeping first-seen order
fn unique(urls: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    urls.filter(|u| seen.insert(u.clone())).collect()
}
