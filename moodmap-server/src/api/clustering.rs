//! Clustering trigger
//!
//! POST /cluster/run?k=8

use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;

use crate::mood::{run_clustering, validate_k, ClusteringOutcome};
use crate::api::extract::ApiQuery;
use crate::{ApiResult, AppState};

pub const DEFAULT_CLUSTER_COUNT: i64 = 8;

#[derive(Debug, Deserialize)]
pub struct ClusterParams {
    #[serde(default = "default_cluster_count")]
    pub k: i64,
}

fn default_cluster_count() -> i64 {
    DEFAULT_CLUSTER_COUNT
}

/// POST /cluster/run
///
/// Recomputes labels for every song. Responds `{clusters: k}`, or
/// `{clusters: 0}` when there is nothing to cluster.
pub async fn run_cluster(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ClusterParams>,
) -> ApiResult<Json<ClusteringOutcome>> {
    let k = validate_k(params.k)?;
    let outcome = run_clustering(&state.db, &state.clustering_lock, k).await?;
    Ok(Json(outcome))
}

pub fn clustering_routes() -> Router<AppState> {
    Router::new().route("/cluster/run", post(run_cluster))
}
