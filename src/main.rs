//! Metalcache - response caching for a bare-metal provisioning gateway
//!
//! Runs the cache with its admin API as a standalone service.

mod api;
mod cache;
mod config;
mod error;
mod models;
mod tasks;

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api::{create_router, AppState};
use cache::CacheManager;
use config::Config;

/// Main entry point for the cache admin service.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Construct the cache manager (which starts the TTL cleanup task)
/// 4. Create Axum router with all endpoints
/// 5. Start HTTP server on configured port
/// 6. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber with env filter
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "metalcache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting metalcache admin service");

    // Load configuration from environment variables
    let config = Config::from_env();
    info!(
        "Configuration loaded: strategy={:?}, max_size={}, max_age={}s, cleanup_interval={}s, port={}",
        config.cache_strategy,
        config.cache_max_size,
        config.cache_max_age,
        config.cleanup_interval,
        config.server_port
    );

    // Construct the cache manager; this also starts the cleanup task
    let state = AppState::from_config(&config);
    info!("Cache manager initialized");

    // Create router with all endpoints
    let app = create_router(state.clone());

    // Bind to configured port
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Admin server listening on http://{}", addr);

    // Start server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state.manager.clone()))
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, disposes the cache manager so the background cleanup
/// task stops before the server drains.
async fn shutdown_signal(manager: Arc<CacheManager>) {
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

    // Stop the background cleanup task
    manager.dispose();
    warn!("Cleanup task stopped");
}
