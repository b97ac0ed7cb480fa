//! moodmap-dashboard library
//!
//! Companion dashboard over a synthetic mood dataset: scatter map,
//! range filters, random playlist with CSV export, k-means colouring.

use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;
pub mod synthetic;

pub use error::{ApiError, ApiResult};
pub use synthetic::SyntheticTrack;

/// Shared dashboard state
#[derive(Clone)]
pub struct AppState {
    /// Dataset generated once at startup
    pub tracks: Arc<Vec<SyntheticTrack>>,
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(tracks: Vec<SyntheticTrack>) -> Self {
        Self {
            tracks: Arc::new(tracks),
            startup_time: Utc::now(),
        }
    }

    /// State over the standard 400-track dataset
    pub fn with_default_dataset() -> Self {
        Self::new(synthetic::generate(
            synthetic::DATASET_SIZE,
            synthetic::DATASET_SEED,
        ))
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::ui_routes())
        .merge(api::data_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
