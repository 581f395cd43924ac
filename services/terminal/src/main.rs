//! Quayside terminal service
//!
//! Serves the yard, container and placement API for a container terminal.
//! Yard occupancy lives in Postgres; slot search and location validation run
//! in the `quayside-yard` engine on every request.

use anyhow::Result;
use quayside_terminal::{
    api, config,
    db::Database,
    placement::PlacementService,
    state::AppState,
};
use quayside_yard::LocationValidator;
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::Config::from_env()?;

    // Prefer RUST_LOG, fall back to QUAYSIDE_LOG_LEVEL
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| config.log_level.clone().into()))
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("Starting quayside terminal service");
    info!(
        listen_addr = %config.listen_addr,
        require_stack_support = config.require_stack_support,
        "Configuration loaded"
    );

    let db = match Database::connect(&config.database).await {
        Ok(db) => db,
        Err(e) => {
            error!(error = %e, "Failed to connect to database");
            return Err(e.into());
        }
    };

    if config.dev_mode {
        info!("Running database migrations (dev mode)");
        if let Err(e) = db.run_migrations().await {
            error!(error = %e, "Failed to run migrations");
            return Err(e.into());
        }
    }

    let validator = LocationValidator::new().require_support(config.require_stack_support);
    let placement = PlacementService::new(db.clone(), validator);
    let state = AppState::new(db, placement);

    let app = api::create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    info!(addr = %config.listen_addr, "Listening for connections");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let mut server_handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let mut shutdown_rx = shutdown_rx;
                loop {
                    if *shutdown_rx.borrow() {
                        break;
                    }
                    if shutdown_rx.changed().await.is_err() {
                        break;
                    }
                }
                info!("HTTP server shutting down");
            })
            .await
    });

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");
        }
        result = &mut server_handle => {
            match result {
                Ok(Ok(())) => info!("Server exited normally"),
                Ok(Err(e)) => error!(error = %e, "Server error"),
                Err(e) => error!(error = %e, "Server task panicked"),
            }
            return Ok(());
        }
    }

    let _ = shutdown_tx.send(true);

    let shutdown_timeout = std::time::Duration::from_secs(10);
    if let Err(e) = tokio::time::timeout(shutdown_timeout, server_handle).await {
        warn!(error = %e, "HTTP server did not drain in time");
    }

    info!("Terminal service shutdown complete");
    Ok(())
}
