//! Docnotify server binary.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use docnotify::queue::{InMemoryBroker, MessageQueueBroker, EXCHANGE_NAME, QUEUE_NAME, ROUTING_KEY};
use docnotify::{create_router, spawn_ingestor_task, AppState, Config};

/// Main entry point for the document and notification server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Declare the notification queue and its binding
/// 4. Wire services and start the notification ingestor
/// 5. Start HTTP server on configured port
/// 6. On SIGINT/SIGTERM close the queue and let the ingestor drain it
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docnotify=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting document notification server");

    let config = Config::from_env();
    info!(
        "Configuration loaded: port={}, notification_service_url={:?}, notify_timeout={}ms, queue_capacity={}, broadcast_capacity={}",
        config.server_port,
        config.notification_service_url,
        config.notify_timeout_ms,
        config.queue_capacity,
        config.broadcast_capacity
    );

    let broker = Arc::new(InMemoryBroker::new(config.queue_capacity));
    broker.bind(ROUTING_KEY, QUEUE_NAME);
    info!(
        "Queue {} bound to exchange {} with routing key {}",
        QUEUE_NAME, EXCHANGE_NAME, ROUTING_KEY
    );

    let state = AppState::from_config(&config, broker.clone())?;

    let consumer = broker
        .subscribe(QUEUE_NAME)
        .context("notification queue is not declared")?;
    let ingestor_handle = spawn_ingestor_task(consumer, Arc::new(state.ingestor()));
    info!("Notification ingestor started");

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    broker.shutdown();
    drain_ingestor(ingestor_handle).await;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for the ingestor to finish the queued backlog, then gives up.
async fn drain_ingestor(handle: JoinHandle<()>) {
    let abort = handle.abort_handle();
    match tokio::time::timeout(std::time::Duration::from_secs(5), handle).await {
        Ok(Ok(())) => info!("Notification ingestor drained"),
        Ok(Err(err)) => warn!("Notification ingestor ended abnormally: {}", err),
        Err(_) => {
            abort.abort();
            warn!("Notification ingestor aborted with messages still queued");
        }
    }
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
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
}
