// swcache - Service-worker style caching reverse proxy

use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use swcache::cache::CacheStorage;
use swcache::cli::Args;
use swcache::config::AppConfig;
use swcache::net::NetworkClient;
use swcache::server::create_router;
use swcache::utils::logging;
use swcache::worker::CacheWorker;
use tokio::signal;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Phase 1: Load configuration
    let config = AppConfig::load(args.config.as_deref())?;

    // Phase 2: Initialize logging
    logging::init(&config.logging)?;
    info!("Starting swcache v{}", env!("CARGO_PKG_VERSION"));

    // Phase 3: Build storage, upstream client and worker
    let origin = config.origin_url()?;
    info!("Fronting upstream origin {}", origin);
    let storage = CacheStorage::new();
    let client = NetworkClient::new(&config.upstream)?;
    let worker = CacheWorker::new(config.cache.clone(), origin, storage, client);

    // Phase 4: Install (pre-cache). A failed static asset aborts startup;
    // dynamic pre-cache failures were already tolerated per asset.
    worker.install().await?;

    // Phase 5: Activate (prune partitions left over from other versions).
    // Serving must not begin until this completes.
    worker.activate().await;

    // Phase 6: Start the recurring eviction job
    let eviction_task = worker.spawn_eviction_task();

    // Phase 7: Build and start the HTTP server
    let app = create_router(config.clone(), worker)?;
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Phase 8: Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The eviction job is owned by the worker lifecycle: tear it down with
    // the server rather than leaving a detached timer behind.
    eviction_task.abort();
    info!("Server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}
