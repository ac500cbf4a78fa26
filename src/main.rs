//! KV Gateway - HTTP façade over a key-value store
//!
//! Upload bookkeeping, job tracking and a generic cache over Redis.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kv_gateway::config::{Config, StoreBackend};
use kv_gateway::metrics::HttpMetrics;
use kv_gateway::store::{MemoryStore, RedisStore, Store};
use kv_gateway::{create_router, spawn_cleanup_task, AppState};

/// Main entry point for the gateway.
///
/// # Startup Sequence
/// 1. Load configuration from environment variables
/// 2. Initialize tracing subscriber for logging
/// 3. Build the metrics registry and the configured store
/// 4. Probe the store; an unreachable store is logged, not fatal
/// 5. Create Axum router with all endpoints
/// 6. Start HTTP server on configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();

    // RUST_LOG wins over the run mode default
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.run_mode.default_log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting KV Gateway");
    info!(
        "Configuration loaded: backend={:?}, store={}, port={}, mode={:?}, store_timeout={}ms",
        config.store_backend,
        config.redis_url,
        config.server_port,
        config.run_mode,
        config.store_timeout_ms
    );

    let metrics = Arc::new(HttpMetrics::new().context("failed to build metrics registry")?);

    let (store, cleanup_handle): (Arc<dyn Store>, Option<JoinHandle<()>>) =
        match config.store_backend {
            StoreBackend::Redis => {
                let store = RedisStore::new(
                    &config.redis_url,
                    &config.redis_password,
                    config.store_timeout(),
                )
                .context("invalid redis configuration")?;
                (Arc::new(store), None)
            }
            StoreBackend::Memory => {
                let store = MemoryStore::new();
                let handle = spawn_cleanup_task(store.clone(), config.cleanup_interval);
                info!("Background cleanup task started");
                (Arc::new(store), Some(handle))
            }
        };

    match store.ping().await {
        Ok(()) => info!("{} store reachable", store.name()),
        Err(err) => warn!(
            error = %err,
            "{} connection failed, serving in degraded mode",
            store.name()
        ),
    }

    let state = AppState::new(store, metrics).with_strict_health(config.health_strict);
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cleanup_handle))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the cleanup task if one is running.
async fn shutdown_signal(cleanup_handle: Option<JoinHandle<()>>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
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

    if let Some(handle) = cleanup_handle {
        handle.abort();
        warn!("Cleanup task aborted");
    }
}
