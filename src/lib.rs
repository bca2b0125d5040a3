pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod logic;
pub mod model;
pub mod service;
pub mod store;

// Export API types
pub use api::handlers;
pub use api::routes::{build_app, create_router};

pub use error::{AppError, Result};

// Export all model types
pub use model::*;

pub use service::Service;

// Export store types
pub use store::{MemoryStore, PostgresStore, Store};

use std::time::Duration;

use anyhow::Context;

/// Connect, migrate and serve until ctrl-c / SIGTERM.
pub async fn run_server(config: config::AppConfig) -> anyhow::Result<()> {
    use std::sync::Arc;
    use tokio::net::TcpListener;

    let database_url = config.database_url();
    let postgres_store = PostgresStore::new(&database_url, &config.database).await?;

    if config.database.run_migrations {
        log::info!("Running database migrations");
        postgres_store.migrate().await?;
    }

    let service = Service::from_config(Arc::new(postgres_store), &config);
    let app = build_app(
        service,
        Duration::from_secs(config.server.request_timeout_secs),
    );

    let bind_address = config.server_address();
    let listener = TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    log::info!("Animal Ekarte API listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    log::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to listen for ctrl-c: {}", e);
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
                log::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("Shutdown signal received");
}
