//! Subscription Service
//!
//! A REST API for managing user subscriptions and summarising their cost.

use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use subscription_service::api;
use subscription_service::config::Config;
use subscription_service::subscriptions::{
    InMemorySubscriptionStore, SqliteSubscriptionStore, SubscriptionService, SubscriptionStore,
};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Load configuration
    let config = Config::from_env();
    info!("Configuration loaded: {:?}", config);
    info!("Starting subscription service...");

    let store = open_store(&config).await?;
    let service = SubscriptionService::new(store);
    info!("Using {} subscription store", service.store_kind());

    let app = api::router(service);

    // Bind to address from config
    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid server address: {}", e))?;

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Server running on http://{}", addr);
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!("Available endpoints:");
    for (route, description) in api::ENDPOINTS {
        info!("  {} - {}", route, description);
    }
    info!("  GET /health - Health check");

    // Setup graceful shutdown
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Open the store selected by `DATABASE_URL`
async fn open_store(config: &Config) -> anyhow::Result<Arc<dyn SubscriptionStore>> {
    if config.database.is_memory() {
        tracing::warn!("Using in-memory store; data will not survive a restart");
        return Ok(Arc::new(InMemorySubscriptionStore::new()));
    }

    let store =
        SqliteSubscriptionStore::connect(&config.database.url, config.database.max_connections)
            .await?;
    info!("Database connection established");
    Ok(Arc::new(store))
}

/// Handle graceful shutdown signals (Ctrl+C, SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down gracefully...");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down gracefully...");
        },
    }
}
