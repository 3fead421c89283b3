//! Feeds and offline cache behind a mock asset server

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::*;
use sekai_cache::{AssetCache, CacheStore, MemoryCacheStore};
use sekai_core::TrackId;
use sekai_player::{FeedLoader, PlayerConfig, PlayerError};
use sekai_storage::PreferenceStore;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> PlayerConfig {
    let mut config = PlayerConfig::default();
    config.assets.jacket_base_url = format!("{}/music/jacket/", server.uri());
    config.assets.audio_base_url = format!("{}/music/long/", server.uri());
    config.assets.catalog_url = format!("{}/music.json", server.uri());
    config.assets.lyrics_url = format!("{}/song-lyrics.json", server.uri());
    config
}

async fn wait_for_requests(server: &MockServer, expected: usize) -> usize {
    for _ in 0..100 {
        let seen = server.received_requests().await.unwrap_or_default().len();
        if seen >= expected {
            return seen;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    server.received_requests().await.unwrap_or_default().len()
}

#[tokio::test]
async fn feeds_load_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/music.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(CATALOG))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/song-lyrics.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(LYRICS))
        .mount(&server)
        .await;

    let config = config_for(&server);
    let feeds = FeedLoader::new().unwrap();

    let catalog = feeds.catalog(&config.assets.catalog_url).await.unwrap();
    assert_eq!(catalog.len(), 3);

    let lyrics = feeds.lyrics(&config.assets.lyrics_url).await;
    assert_eq!(lyrics.get(TrackId::new(74)).unwrap().len(), 2);
}

#[tokio::test]
async fn catalog_failure_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/music.json"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let config = config_for(&server);
    let result = FeedLoader::new()
        .unwrap()
        .catalog(&config.assets.catalog_url)
        .await;
    assert!(matches!(result, Err(PlayerError::Feed { .. })));
}

#[tokio::test]
async fn lyrics_failure_degrades() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/song-lyrics.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let config = config_for(&server);
    let lyrics = FeedLoader::new()
        .unwrap()
        .lyrics(&config.assets.lyrics_url)
        .await;
    assert!(lyrics.is_empty());
}

#[tokio::test]
async fn playing_prefetches_the_upcoming_window() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/music/long/.+\.mp3$"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 64]))
        .expect(3)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/music/jacket/.+\.png$"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 16]))
        .expect(3)
        .mount(&server)
        .await;

    let config = config_for(&server);
    let store = Arc::new(MemoryCacheStore::new());
    let cache = AssetCache::new(
        config.asset_urls(),
        Some(store.clone() as Arc<dyn CacheStore>),
        config.cache_settings(),
    )
    .unwrap();

    let mut f = Fixture::build(PreferenceStore::in_memory(), &config, Some(cache));
    f.player.play(TrackId::new(74), None).unwrap();

    assert_eq!(wait_for_requests(&server, 6).await, 6);

    let cache = f.player.cache().unwrap().clone();
    for _ in 0..100 {
        let count = cache.cached_count().await;
        if count.audio == 3 && count.jackets == 3 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    let audio_url = format!("{}/music/long/0090_01/0090_01.mp3", server.uri());
    assert!(store.contains(&audio_url).await.unwrap());
    let jacket_url = format!("{}/music/jacket/jacket_s_001/jacket_s_001.png", server.uri());
    assert!(store.contains(&jacket_url).await.unwrap());
    let count = cache.cached_count().await;
    assert_eq!((count.audio, count.jackets), (3, 3));
}
