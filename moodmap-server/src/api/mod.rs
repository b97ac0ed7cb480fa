//! HTTP API handlers for moodmap-server

pub mod buildinfo;
pub mod clustering;
pub mod extract;
pub mod features;
pub mod generate;
pub mod health;
pub mod mood;
pub mod recommend;

use axum::http::Uri;
use axum::Router;

use crate::{ApiError, AppState};

pub use buildinfo::get_build_info;
pub use extract::{ApiJson, ApiPath, ApiQuery};
pub use generate::generate_routes;
pub use health::health_routes;

/// Song catalogue routes: ingest, clustering, recommendation, mood queries
pub fn music_routes() -> Router<AppState> {
    Router::new()
        .merge(features::feature_routes())
        .merge(clustering::clustering_routes())
        .merge(recommend::recommend_routes())
        .merge(mood::mood_routes())
}

/// Fallback for unknown routes
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("No route for {}", uri.path()))
}
