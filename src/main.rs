//! Greeting Store - a record store service
//!
//! Composes the configured storage engine with the read-through cache and
//! the resilience wrapper, then serves the record API over HTTP.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tokio::sync::RwLock;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use greeting_store::api::create_router;
use greeting_store::cache::{CacheStore, CachedStore};
use greeting_store::resilience::ResilientStore;
use greeting_store::store::select;
use greeting_store::{spawn_cleanup_task, AppState, Config, RecordService};

/// Main entry point for the record store server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Open the selected storage engine (fatal if missing or unsupported)
/// 4. Wrap it: engine -> read-through cache -> resilience
/// 5. Start background TTL cleanup task
/// 6. Serve HTTP on the configured port until SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "greeting_store=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Greeting Store");

    let config = Config::from_env();
    info!(
        "Configuration loaded: provider={:?}, cache_ttl={:?}, max_entries={}, port={}, cleanup_interval={}s",
        config.persistence.provider,
        config.cache.ttl,
        config.cache.max_entries,
        config.server_port,
        config.cleanup_interval
    );

    let engine = select(config.persistence.provider.as_deref(), &config.persistence)
        .await
        .context("failed to initialise persistence provider")?;

    let cache = Arc::new(RwLock::new(CacheStore::new(
        config.cache.max_entries,
        config.cache.ttl,
    )));
    let cached = CachedStore::new(engine, cache.clone())
        .with_listing_invalidation(config.cache.invalidate_listings);
    let resilient = ResilientStore::new(cached, config.resilience.clone());
    let service = RecordService::new(Arc::new(resilient));
    info!("Record store stack initialized");

    let cleanup_handle = spawn_cleanup_task(cache.clone(), config.cleanup_interval);
    info!("Background cleanup task started");

    let app = create_router(AppState::new(service, cache));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cleanup_handle))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM), then aborts the cleanup task.
async fn shutdown_signal(cleanup_handle: tokio::task::JoinHandle<()>) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    cleanup_handle.abort();
    warn!("Cleanup task aborted");
}
