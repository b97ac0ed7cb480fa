//! moodmap-server - mood-based music catalogue service
//!
//! Startup order: config, tracing, root folder, database, generator
//! client, HTTP server. The database pool is closed after the server has
//! drained on shutdown.

use anyhow::{Context, Result};
use clap::Parser;
use moodmap_common::config::{RootFolderInitializer, RootFolderResolver, TomlConfig, PORT_ENV};
use moodmap_common::db::{close_database, init_database};
use moodmap_common::logging::init_tracing;
use moodmap_server::services::MusicGenClient;
use moodmap_server::{build_router, AppState, RouterOptions};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info, warn};

const MODULE_NAME: &str = "moodmap-server";

/// Command-line arguments for moodmap-server
#[derive(Parser, Debug)]
#[command(name = "moodmap-server")]
#[command(about = "Mood-based music recommendation and clustering service")]
#[command(version)]
struct Args {
    /// Root folder holding the database
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// Explicit TOML config file
    #[arg(short, long, env = "MOODMAP_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on (overrides config)
    #[arg(short, long, env = PORT_ENV)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config =
        TomlConfig::load(MODULE_NAME, args.config.as_deref()).context("Failed to load config")?;
    if let Some(port) = args.port {
        config.port = port;
    }

    init_tracing(&config.logging).context("Failed to initialize logging")?;

    info!(
        "Starting moodmap-server v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let root_folder = RootFolderResolver::new(MODULE_NAME)
        .with_cli_arg(args.root_folder)
        .with_toml(&config)
        .resolve();
    let initializer = RootFolderInitializer::new(root_folder);
    initializer.ensure_directory_exists()?;

    let db_path = initializer.database_path(&config);
    info!("Database path: {}", db_path.display());

    let pool = match init_database(&db_path).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to open database: {}", e);
            return Err(e.into());
        }
    };

    let mut state = AppState::new(pool.clone()).with_app_name(config.app_name.clone());
    match &config.music_gen.endpoint {
        Some(endpoint) => {
            let client = MusicGenClient::new(
                endpoint.clone(),
                Duration::from_secs(config.music_gen.timeout_secs),
            )?;
            info!("Music generation endpoint: {}", endpoint);
            state = state.with_generator(Arc::new(client));
        }
        None => warn!("No music generation endpoint configured; /generate will return 503"),
    }

    let app = build_router(state, &RouterOptions::from_config(&config));

    let addr = format!("{}:{}", config.bind_address, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("moodmap-server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    close_database(&pool).await;
    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
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
