//! Dataset endpoints: mood map, playlist, CSV export, clusters
//!
//! Every endpoint takes the same optional inclusive ranges
//! (`e_min`, `e_max`, `v_min`, `v_max`, defaulting to 0..1).

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use moodmap_common::kmeans::KMeans;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::synthetic::{self, RangeFilter, SyntheticTrack, PLAYLIST_SIZE};
use crate::AppState;

pub const DEFAULT_CLUSTERS: usize = 12;
pub const MIN_CLUSTERS: usize = 2;
pub const MAX_CLUSTERS: usize = 30;
pub const CSV_FILE_NAME: &str = "moodmap_playlist.csv";

/// Query parameters shared by the dataset endpoints
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub e_min: Option<f64>,
    pub e_max: Option<f64>,
    pub v_min: Option<f64>,
    pub v_max: Option<f64>,
    /// Playlist length cap
    pub size: Option<usize>,
    /// Fixes the playlist sample so the table and CSV agree
    pub seed: Option<u64>,
    /// Cluster count
    pub k: Option<usize>,
}

impl DashboardQuery {
    pub fn range_filter(&self) -> ApiResult<RangeFilter> {
        let defaults = RangeFilter::default();
        let filter = RangeFilter {
            e_min: self.e_min.unwrap_or(defaults.e_min),
            e_max: self.e_max.unwrap_or(defaults.e_max),
            v_min: self.v_min.unwrap_or(defaults.v_min),
            v_max: self.v_max.unwrap_or(defaults.v_max),
        };

        for (name, min, max) in [
            ("energy", filter.e_min, filter.e_max),
            ("valence", filter.v_min, filter.v_max),
        ] {
            if !min.is_finite() || !max.is_finite() {
                return Err(ApiError::BadRequest(format!(
                    "{} bounds must be finite numbers",
                    name
                )));
            }
            if min > max {
                return Err(ApiError::BadRequest(format!(
                    "{} range is empty: {} > {}",
                    name, min, max
                )));
            }
        }

        Ok(filter)
    }

    fn playlist_size(&self) -> ApiResult<usize> {
        match self.size.unwrap_or(PLAYLIST_SIZE) {
            0 => Err(ApiError::BadRequest("size must be at least 1".to_string())),
            size => Ok(size),
        }
    }

    fn cluster_count(&self) -> ApiResult<usize> {
        let k = self.k.unwrap_or(DEFAULT_CLUSTERS);
        if !(MIN_CLUSTERS..=MAX_CLUSTERS).contains(&k) {
            return Err(ApiError::BadRequest(format!(
                "k must be between {} and {}, got {}",
                MIN_CLUSTERS, MAX_CLUSTERS, k
            )));
        }
        Ok(k)
    }
}

#[derive(Debug, Serialize)]
pub struct TracksResponse {
    pub count: usize,
    pub tracks: Vec<SyntheticTrack>,
}

/// GET /api/mood-map
pub async fn get_mood_map(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> ApiResult<Json<TracksResponse>> {
    let filter = query.range_filter()?;
    let tracks: Vec<SyntheticTrack> = filter
        .apply(&state.tracks)
        .into_iter()
        .cloned()
        .collect();

    Ok(Json(TracksResponse {
        count: tracks.len(),
        tracks,
    }))
}

fn sample(state: &AppState, query: &DashboardQuery) -> ApiResult<Vec<SyntheticTrack>> {
    let filter = query.range_filter()?;
    let size = query.playlist_size()?;
    let filtered = filter.apply(&state.tracks);

    let mut rng = match query.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    Ok(synthetic::sample_playlist(&filtered, size, &mut rng)
        .into_iter()
        .cloned()
        .collect())
}

/// GET /api/playlist
pub async fn get_playlist(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> ApiResult<Json<TracksResponse>> {
    let tracks = sample(&state, &query)?;
    Ok(Json(TracksResponse {
        count: tracks.len(),
        tracks,
    }))
}

/// GET /api/playlist.csv
pub async fn get_playlist_csv(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> ApiResult<Response> {
    let tracks = sample(&state, &query)?;
    let refs: Vec<&SyntheticTrack> = tracks.iter().collect();
    let disposition = format!("attachment; filename={}", CSV_FILE_NAME);

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        synthetic::playlist_csv(&refs),
    )
        .into_response())
}

#[derive(Debug, Serialize)]
pub struct ClusteredPoint {
    pub title: String,
    pub energy: f64,
    pub valence: f64,
    pub cluster: usize,
}

#[derive(Debug, Serialize)]
pub struct Centroid {
    pub energy: f64,
    pub valence: f64,
}

#[derive(Debug, Serialize)]
pub struct ClustersResponse {
    /// Requested cluster count
    pub k: usize,
    pub points: Vec<ClusteredPoint>,
    pub centroids: Vec<Centroid>,
}

/// GET /api/clusters
///
/// k-means over (energy, valence) of the filtered tracks.
pub async fn get_clusters(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> ApiResult<Json<ClustersResponse>> {
    let filter = query.range_filter()?;
    let k = query.cluster_count()?;
    let tracks: Vec<SyntheticTrack> = filter
        .apply(&state.tracks)
        .into_iter()
        .cloned()
        .collect();

    let rows: Vec<Vec<f64>> = tracks.iter().map(|t| vec![t.energy, t.valence]).collect();
    let fit = tokio::task::spawn_blocking(move || KMeans::new(k).fit(&rows))
        .await
        .map_err(|e| ApiError::Internal(format!("Clustering task failed: {}", e)))?;

    let Some(fit) = fit else {
        return Ok(Json(ClustersResponse {
            k,
            points: Vec::new(),
            centroids: Vec::new(),
        }));
    };

    let points = tracks
        .into_iter()
        .zip(fit.labels)
        .map(|(track, cluster)| ClusteredPoint {
            title: track.title,
            energy: track.energy,
            valence: track.valence,
            cluster,
        })
        .collect();

    let centroids = fit
        .centroids
        .iter()
        .map(|c| Centroid {
            energy: c[0],
            valence: c[1],
        })
        .collect();

    Ok(Json(ClustersResponse {
        k,
        points,
        centroids,
    }))
}

pub fn data_routes() -> Router<AppState> {
    Router::new()
        .route("/api/mood-map", get(get_mood_map))
        .route("/api/playlist", get(get_playlist))
        .route("/api/playlist.csv", get(get_playlist_csv))
        .route("/api/clusters", get(get_clusters))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_defaults() {
        let query = DashboardQuery::default();
        assert_eq!(query.range_filter().unwrap(), RangeFilter::default());
        assert_eq!(query.playlist_size().unwrap(), 20);
        assert_eq!(query.cluster_count().unwrap(), 12);
    }

    #[test]
    fn test_query_rejects_bad_values() {
        let inverted = DashboardQuery {
            e_min: Some(0.8),
            e_max: Some(0.2),
            ..Default::default()
        };
        assert!(inverted.range_filter().is_err());

        let nan = DashboardQuery {
            v_max: Some(f64::NAN),
            ..Default::default()
        };
        assert!(nan.range_filter().is_err());

        for k in [1, 31] {
            let query = DashboardQuery {
                k: Some(k),
                ..Default::default()
            };
            assert!(query.cluster_count().is_err());
        }

        let empty = DashboardQuery {
            size: Some(0),
            ..Default::default()
        };
        assert!(empty.playlist_size().is_err());
    }
}
