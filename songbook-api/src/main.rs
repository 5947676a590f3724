//! songbook-api - song catalog HTTP service
//!
//! Startup order: `.env`, arguments, config file, tracing, storage, listener.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use songbook_api::cli::Args;
use songbook_api::db::{InMemorySongRepository, SongRepository, SqliteSongRepository};
use songbook_api::{build_router, AppState};
use songbook_common::config::{load_config, ServiceConfig};
use songbook_common::db::init_database;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is normal
    let dotenv = dotenvy::dotenv();

    let args = Args::parse();

    let file_config = load_config(args.config.as_deref()).context("Failed to load config file")?;
    let config = ServiceConfig::resolve(
        args.overrides(),
        file_config.as_ref().map(|(_, config)| config),
    );

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("songbook_api={0},songbook_common={0},tower_http={0}", config.log_level)
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting songbook-api v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    match dotenv {
        Ok(path) => info!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => warn!("Ignoring unreadable .env file: {}", e),
    }

    match &file_config {
        Some((path, _)) => info!("Config file: {}", path.display()),
        None => info!("No config file found, using defaults"),
    }

    let repo: Arc<dyn SongRepository> = if args.in_memory {
        info!("Using in-memory catalog (nothing is persisted)");
        Arc::new(InMemorySongRepository::new())
    } else {
        info!("Database path: {}", config.database_path.display());
        let pool = init_database(&config.database_path)
            .await
            .context("Failed to initialize database")?;
        Arc::new(SqliteSongRepository::new(pool))
    };

    let state = AppState::new(repo).with_request_timeout(config.request_timeout);
    let app = build_router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("songbook-api listening on http://{}", addr);
    info!("API docs: http://{}/docs", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolve on Ctrl+C or SIGTERM
///
/// If a handler cannot be installed that branch never fires; the other one
/// still can.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
