//! losswatch - browser dashboard of reported military losses.
//!
//! Serves one page with a source dropdown and two stacked-area charts
//! (infantry, equipment). Feeds are fetched on demand and cached on disk
//! for a short TTL.

mod page;
mod server;

use std::io;
use std::sync::Arc;

use anyhow::{Context, Result};
use losswatch_core::{
    Dashboard, FeedClient, FsCacheStore, RefreshCache, Settings, SourceRegistry,
};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use server::AppState;

/// Log file prefix inside `LOSSWATCH_LOG_DIR`
const LOG_FILE_PREFIX: &str = "losswatch.log";

/// Initialize the tracing subscriber for logging.
///
/// The returned guard flushes the file writer and must live until exit.
fn init_tracing(settings: &Settings) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_layer, guard) = match &settings.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let settings = Settings::from_env().context("Invalid configuration")?;
    let _guard = init_tracing(&settings);
    info!("losswatch starting");

    let registry = SourceRegistry::load(&settings.sources_path).with_context(|| {
        format!(
            "Failed to load source registry from {}",
            settings.sources_path.display()
        )
    })?;
    let registry = Arc::new(registry);
    info!(
        sources = registry.entries().len(),
        default = %registry.default_entry().key,
        "Source registry loaded"
    );

    let store = FsCacheStore::new(settings.cache_dir.clone())?;
    info!(cache_dir = %settings.cache_dir.display(), ttl_secs = settings.cache_ttl.as_secs(), "Cache ready");

    let cache = RefreshCache::new(
        registry.clone(),
        Arc::new(FeedClient::with_timeout(settings.http_timeout)?),
        Arc::new(store),
        settings.cache_ttl,
    );
    let state = Arc::new(AppState {
        dashboard: Dashboard::new(registry, cache),
    });

    server::start_server(state, settings.bind).await?;

    info!("losswatch shutting down");
    Ok(())
}
