//! Fetch routing of the offline worker
//!
//! Jacket images are served cache-first and stored under their URL
//! without query string. Audio is cache-first but never stored on the
//! way through (bulk runs and preloads store it). Everything else goes to
//! the network first and falls back to the cache.

use url::Url;

/// How one request is served
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Cache-first on `key`, store on success
    Jacket { key: String },
    /// Cache-first on the full URL, never stored
    Audio,
    /// Network-first, cache as fallback
    NetworkFirst,
}

/// Route `url` for an asset host; `None` for non-HTTP schemes
pub fn route_for(url: &Url, asset_host: &str) -> Option<Route> {
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }

    let on_asset_host = url.host_str() == Some(asset_host);
    let path = url.path();
    if on_asset_host && path.contains("/jacket/") {
        Some(Route::Jacket {
            key: format!("{}{}", url.origin().ascii_serialization(), path),
        })
    } else if on_asset_host && path.ends_with(".mp3") {
        Some(Route::Audio)
    } else {
        Some(Route::NetworkFirst)
    }
}
