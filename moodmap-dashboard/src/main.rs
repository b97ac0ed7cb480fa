//! moodmap-dashboard - synthetic mood map explorer
//!
//! Read-only: no database, the dataset is regenerated from a fixed seed at
//! every start.

use anyhow::{Context, Result};
use clap::Parser;
use moodmap_common::config::TomlConfig;
use moodmap_common::logging::init_tracing;
use moodmap_dashboard::{build_router, AppState};
use std::path::PathBuf;
use tokio::signal;
use tracing::{error, info};

const MODULE_NAME: &str = "moodmap-dashboard";
const DEFAULT_PORT: u16 = 8501;

#[derive(Parser, Debug)]
#[command(name = "moodmap-dashboard")]
#[command(about = "Mood map dashboard over a synthetic dataset")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Explicit TOML config file (logging and bind address)
    #[arg(short, long, env = "MOODMAP_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config =
        TomlConfig::load(MODULE_NAME, args.config.as_deref()).context("Failed to load config")?;
    init_tracing(&config.logging).context("Failed to initialize logging")?;

    info!("Starting moodmap-dashboard v{}", env!("CARGO_PKG_VERSION"));

    let state = AppState::with_default_dataset();
    info!("Synthetic dataset ready: {} tracks", state.tracks.len());

    let app = build_router(state);

    let addr = format!("{}:{}", config.bind_address, args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("moodmap-dashboard listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Dashboard shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
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
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received terminate signal, shutting down"),
    }
}
