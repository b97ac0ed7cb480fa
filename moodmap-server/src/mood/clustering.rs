//! Clustering run: read every song, fit k-means on
//! (energy, valence, danceability, tempo), write labels back.
//!
//! Each run recomputes all labels. Label identity is not stable across
//! runs: the same song may move from cluster 2 to cluster 5 on a rerun even
//! if nothing changed.

use moodmap_common::db::songs;
use moodmap_common::kmeans::KMeans;
use moodmap_common::{Error, Result};
use serde::Serialize;
use sqlx::SqlitePool;
use tokio::sync::Mutex;
use tracing::{debug, info};

pub const MIN_CLUSTERS: i64 = 2;
pub const MAX_CLUSTERS: i64 = 64;

/// Result of one clustering run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClusteringOutcome {
    /// Songs whose label was written
    pub assigned_count: u64,
    /// Requested cluster count, 0 when the store was empty
    pub clusters: usize,
}

/// Accept 2 <= k <= 64
pub fn validate_k(k: i64) -> Result<usize> {
    if !(MIN_CLUSTERS..=MAX_CLUSTERS).contains(&k) {
        return Err(Error::InvalidInput(format!(
            "k must be between {} and {}, got {}",
            MIN_CLUSTERS, MAX_CLUSTERS, k
        )));
    }
    Ok(k as usize)
}

/// Recompute cluster labels for every stored song.
///
/// `lock` is held from the read to the end of the bulk write. Songs
/// inserted after the read are left untouched. With fewer songs than `k`
/// the fit uses one cluster per song.
pub async fn run_clustering(
    pool: &SqlitePool,
    lock: &Mutex<()>,
    k: usize,
) -> Result<ClusteringOutcome> {
    let _guard = lock.lock().await;

    let records = songs::all_songs(pool).await?;
    if records.is_empty() {
        info!("Clustering skipped: song store is empty");
        return Ok(ClusteringOutcome {
            assigned_count: 0,
            clusters: 0,
        });
    }

    let rows: Vec<Vec<f64>> = records.iter().map(|song| song.feature_row()).collect();
    let model = KMeans::new(k);

    let fit = tokio::task::spawn_blocking(move || model.fit(&rows))
        .await
        .map_err(|e| Error::Internal(format!("Clustering task failed: {}", e)))?
        .ok_or_else(|| Error::Internal("k-means produced no result".to_string()))?;

    debug!(
        k,
        songs = records.len(),
        iterations = fit.iterations,
        inertia = fit.inertia,
        "k-means fit complete"
    );

    let labels: Vec<(String, i64)> = records
        .iter()
        .zip(fit.labels.iter())
        .map(|(song, &label)| (song.id.clone(), label as i64))
        .collect();

    let assigned_count = songs::assign_clusters(pool, &labels).await?;
    info!(k, assigned_count, "Clustering run complete");

    Ok(ClusteringOutcome {
        assigned_count,
        clusters: k,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_k_bounds() {
        assert_eq!(validate_k(2).unwrap(), 2);
        assert_eq!(validate_k(64).unwrap(), 64);
        assert!(matches!(validate_k(1), Err(Error::InvalidInput(_))));
        assert!(matches!(validate_k(65), Err(Error::InvalidInput(_))));
        assert!(validate_k(0).is_err());
        assert!(validate_k(-8).is_err());
    }
}
