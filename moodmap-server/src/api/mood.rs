//! Mood cluster and playlist queries

use axum::{extract::State, routing::get, Json, Router};
use moodmap_common::db::{ClusterAggregate, SongFilter};
use serde::{Deserialize, Serialize};

use crate::mood::playlist::DEFAULT_PLAYLIST_SIZE;
use crate::mood::{aggregate_clusters, filter_playlist, PlaylistItem};
use crate::api::extract::ApiQuery;
use crate::{ApiResult, AppState};

#[derive(Debug, Serialize)]
pub struct MoodClustersResponse {
    pub clusters: Vec<ClusterAggregate>,
}

/// GET /get_mood_clusters
///
/// Centroid and size per cluster label; unclustered songs appear under
/// `cluster: null`.
pub async fn get_mood_clusters(
    State(state): State<AppState>,
) -> ApiResult<Json<MoodClustersResponse>> {
    let clusters = aggregate_clusters(&state.db).await?;
    Ok(Json(MoodClustersResponse { clusters }))
}

#[derive(Debug, Deserialize)]
pub struct PlaylistParams {
    pub cluster: Option<i64>,
    pub e_min: Option<f64>,
    pub e_max: Option<f64>,
    pub v_min: Option<f64>,
    pub v_max: Option<f64>,
    #[serde(default = "default_playlist_size")]
    pub k: i64,
}

fn default_playlist_size() -> i64 {
    DEFAULT_PLAYLIST_SIZE
}

impl PlaylistParams {
    pub fn filter(&self) -> SongFilter {
        SongFilter::from_bounds(self.cluster, self.e_min, self.e_max, self.v_min, self.v_max)
    }
}

#[derive(Debug, Serialize)]
pub struct PlaylistResponse {
    pub items: Vec<PlaylistItem>,
}

/// GET /get_playlist_by_mood
///
/// A range is applied only when both of its bounds are given.
pub async fn get_playlist_by_mood(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<PlaylistParams>,
) -> ApiResult<Json<PlaylistResponse>> {
    let items = filter_playlist(&state.db, &params.filter(), params.k).await?;
    Ok(Json(PlaylistResponse { items }))
}

pub fn mood_routes() -> Router<AppState> {
    Router::new()
        .route("/get_mood_clusters", get(get_mood_clusters))
        .route("/get_playlist_by_mood", get(get_playlist_by_mood))
}
