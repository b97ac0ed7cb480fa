//! moodmap-server library interface
//!
//! HTTP API over the song store: feature ingest, k-means clustering,
//! mood-based recommendation and playlists, and mood-conditioned audio
//! generation.

pub mod api;
pub mod error;
pub mod mood;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderName, HeaderValue};
use axum::Router;
use chrono::{DateTime, Utc};
use moodmap_common::config::TomlConfig;
use services::feature_extractor::FeatureExtractor;
use services::music_gen_client::AudioGenerator;
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Song store connection pool
    pub db: SqlitePool,
    pub extractor: Arc<FeatureExtractor>,
    /// Generative audio backend; `None` disables `/generate`
    pub generator: Option<Arc<dyn AudioGenerator>>,
    /// Held for a whole clustering run so overlapping runs serialize
    pub clustering_lock: Arc<Mutex<()>>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Name reported by `GET /`
    pub app_name: String,
}

impl AppState {
    pub fn new(db: SqlitePool) -> Self {
        Self {
            db,
            extractor: Arc::new(FeatureExtractor::default()),
            generator: None,
            clustering_lock: Arc::new(Mutex::new(())),
            startup_time: Utc::now(),
            app_name: TomlConfig::default().app_name,
        }
    }

    pub fn with_generator(mut self, generator: Arc<dyn AudioGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = app_name.into();
        self
    }
}

/// HTTP-layer settings that are not needed by handlers
#[derive(Debug, Clone)]
pub struct RouterOptions {
    pub cors_origins: Vec<String>,
    pub max_upload_bytes: usize,
}

impl RouterOptions {
    pub fn from_config(config: &TomlConfig) -> Self {
        Self {
            cors_origins: config.cors_origins.clone(),
            max_upload_bytes: config.max_upload_bytes,
        }
    }
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self::from_config(&TomlConfig::default())
    }
}

/// Build application router
///
/// Catalogue routes are served both at the root and under `/api/music`;
/// generation also under `/api`.
pub fn build_router(state: AppState, options: &RouterOptions) -> Router {
    Router::new()
        .merge(api::health_routes())
        .merge(api::music_routes())
        .merge(api::generate_routes())
        .nest("/api/music", api::music_routes())
        .nest("/api", api::generate_routes())
        .fallback(api::not_found)
        .layer(DefaultBodyLimit::max(options.max_upload_bytes))
        .layer(cors_layer(&options.cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS for the configured browser origins, credentials allowed.
///
/// Methods and headers mirror the preflight request since a wildcard is not
/// permitted together with credentials. The clip metadata headers of
/// `/generate` are exposed to scripts.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
        .expose_headers([
            header::CONTENT_DISPOSITION,
            HeaderName::from_static("x-duration"),
            HeaderName::from_static("x-preview"),
        ])
}
