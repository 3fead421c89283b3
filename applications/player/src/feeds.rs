//! Catalog and lyrics feed loading
//!
//! A feed source is either an http(s) URL or a path on the local
//! filesystem. The catalog is required; lyrics are optional.

use std::time::Duration;

use reqwest::Client;
use sekai_core::{CatalogStore, Lyrics};
use tracing::{info, warn};
use url::Url;

use crate::error::{PlayerError, Result};

/// Loads the JSON feeds the player starts from
#[derive(Debug, Clone)]
pub struct FeedLoader {
    http: Client,
}

impl FeedLoader {
    pub fn new() -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(format!("SekaiPlayer/{}", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http })
    }

    /// Fetch the raw document behind `source`
    pub async fn fetch(&self, source: &str) -> Result<String> {
        match Url::parse(source) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {
                let response = self.http.get(url).send().await?;
                let status = response.status();
                if !status.is_success() {
                    return Err(PlayerError::feed(source, format!("HTTP {status}")));
                }
                Ok(response.text().await?)
            }
            _ => tokio::fs::read_to_string(source)
                .await
                .map_err(|e| PlayerError::feed(source, e)),
        }
    }

    /// Load the catalog; any failure is an error
    pub async fn catalog(&self, source: &str) -> Result<CatalogStore> {
        let raw = self.fetch(source).await?;
        let catalog = CatalogStore::from_json(&raw)?;
        info!(source, tracks = catalog.len(), "Catalog loaded");
        Ok(catalog)
    }

    /// Load lyrics, degrading to an empty set when the feed is unavailable
    pub async fn lyrics(&self, source: &str) -> Lyrics {
        let parsed = match self.fetch(source).await {
            Ok(raw) => Lyrics::from_json(&raw).map_err(PlayerError::from),
            Err(e) => Err(e),
        };

        match parsed {
            Ok(lyrics) => {
                info!(source, tracks = lyrics.len(), "Lyrics loaded");
                lyrics
            }
            Err(e) => {
                warn!(source, error = %e, "Lyrics unavailable");
                Lyrics::default()
            }
        }
    }
}
