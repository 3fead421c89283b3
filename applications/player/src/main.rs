/// SEKAI player - offline cache worker
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use sekai_cache::{AssetCache, AssetKind, CacheProgress, CacheStore, DiskCacheStore};
use sekai_player::{FeedLoader, PlayerConfig};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "sekai-player")]
#[command(about = "Offline asset cache worker for the SEKAI player", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, default_value = sekai_player::config::DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Cache every jacket, then every vocal variant (default)
    Warm,
    /// Show how many assets are cached
    Status,
    /// Delete every cached asset
    Clear,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sekai_player=info,sekai_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = PlayerConfig::load_from(&cli.config)?;
    config.validate()?;

    let store = DiskCacheStore::open(&config.cache.directory, &config.cache.name).await?;
    info!(dir = %store.dir().display(), "Cache storage opened");
    let store: Arc<dyn CacheStore> = Arc::new(store);
    let cache = AssetCache::new(config.asset_urls(), Some(store), config.cache_settings())?;

    match cli.command.unwrap_or(Commands::Warm) {
        Commands::Warm => warm(&config, cache).await?,
        Commands::Status => {
            let count = cache.cached_count().await;
            info!(
                jackets = count.jackets,
                audio = count.audio,
                total = count.total,
                "Cached assets"
            );
        }
        Commands::Clear => {
            cache.clear().await?;
            info!("Cache cleared");
        }
    }

    Ok(())
}

async fn warm(config: &PlayerConfig, cache: AssetCache) -> anyhow::Result<()> {
    let feeds = FeedLoader::new()?;
    let catalog = feeds.catalog(&config.assets.catalog_url).await?;

    let abort_handle = cache.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() && abort_handle.abort() {
            warn!("Interrupted, stopping after in-flight downloads");
        }
    });

    let summary = cache.cache_all(catalog.tracks(), log_progress).await?;

    match summary {
        Some(summary) => info!(
            jackets_cached = summary.jackets.cached,
            jackets_skipped = summary.jackets.skipped,
            audio_cached = summary.audio.cached,
            audio_skipped = summary.audio.skipped,
            "Caching complete"
        ),
        None => warn!("Caching aborted"),
    }

    Ok(())
}

fn log_progress(progress: &CacheProgress) {
    let kind = match progress.kind {
        AssetKind::Jacket => "jackets",
        AssetKind::Audio => "audio",
    };

    if progress.current == progress.total || progress.current % 25 == 0 {
        info!(
            kind,
            current = progress.current,
            total = progress.total,
            cached = progress.cached,
            skipped = progress.skipped,
            failed = progress.failed(),
            "Caching progress"
        );
    }
}
