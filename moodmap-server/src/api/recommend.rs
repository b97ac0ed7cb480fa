//! Recommendation endpoints
//!
//! Both entry points rank the same way; they differ only in how the
//! request is expressed and in the default `k`.

use axum::{extract::State, routing::get, Json, Router};
use moodmap_common::MoodBox;
use serde::{Deserialize, Serialize};

use crate::mood::{recommend, RecommendRequest, ScoredSong};
use crate::api::extract::{ApiJson, ApiQuery};
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct RecommendBody {
    #[serde(default)]
    pub seed_song_id: Option<String>,
    /// `[e_min, e_max, v_min, v_max]`
    #[serde(default)]
    pub mood_box: Option<MoodBox>,
    #[serde(default = "default_body_k")]
    pub k: i64,
}

#[derive(Debug, Deserialize)]
pub struct RecommendParams {
    pub song_id: Option<String>,
    #[serde(default = "default_query_k")]
    pub k: i64,
}

fn default_body_k() -> i64 {
    5
}

fn default_query_k() -> i64 {
    10
}

#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub items: Vec<ScoredSong>,
}

fn result_count(k: i64) -> ApiResult<usize> {
    if k < 1 {
        return Err(ApiError::BadRequest(format!("k must be at least 1, got {}", k)));
    }
    Ok(k as usize)
}

/// POST /recommend
///
/// The seed song, when given, is the target; otherwise the mood box
/// center, otherwise (0.5, 0.5). The mood box also restricts candidates.
pub async fn recommend_by_body(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RecommendBody>,
) -> ApiResult<Json<RecommendResponse>> {
    let request = RecommendRequest {
        seed_song_id: body.seed_song_id,
        mood_box: body.mood_box,
        k: result_count(body.k)?,
    };

    let items = recommend(&state.db, &request).await?;
    Ok(Json(RecommendResponse { items }))
}

/// GET /recommend?song_id=...&k=10
pub async fn recommend_by_query(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<RecommendParams>,
) -> ApiResult<Json<RecommendResponse>> {
    let request = RecommendRequest {
        seed_song_id: params.song_id,
        mood_box: None,
        k: result_count(params.k)?,
    };

    let items = recommend(&state.db, &request).await?;
    Ok(Json(RecommendResponse { items }))
}

pub fn recommend_routes() -> Router<AppState> {
    Router::new().route(
        "/recommend",
        get(recommend_by_query).post(recommend_by_body),
    )
}
