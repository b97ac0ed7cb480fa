//! Cluster aggregation: mean (energy, valence) and size per label
//!
//! Songs that were never clustered form their own group with
//! `cluster: None`. Groups come back ordered by label with the unlabelled
//! group last; callers should not rely on it.

use moodmap_common::db::{songs, ClusterAggregate, SongRecord};
use moodmap_common::{MoodPoint, Result};
use sqlx::SqlitePool;
use std::collections::BTreeMap;

/// Aggregate straight from the store (`GROUP BY cluster`)
pub async fn aggregate_clusters(pool: &SqlitePool) -> Result<Vec<ClusterAggregate>> {
    songs::aggregate_clusters(pool).await
}

/// In-memory equivalent of [`aggregate_clusters`] over records already
/// loaded, with the same grouping and ordering
pub fn aggregate(records: &[SongRecord]) -> Vec<ClusterAggregate> {
    let mut groups: BTreeMap<Option<i64>, (f64, f64, i64)> = BTreeMap::new();

    for song in records {
        let entry = groups.entry(song.cluster).or_insert((0.0, 0.0, 0));
        entry.0 += song.energy;
        entry.1 += song.valence;
        entry.2 += 1;
    }

    let mut aggregates: Vec<ClusterAggregate> = groups
        .into_iter()
        .map(|(cluster, (energy_sum, valence_sum, size))| ClusterAggregate {
            cluster,
            centroid: MoodPoint::new(energy_sum / size as f64, valence_sum / size as f64),
            size,
        })
        .collect();

    aggregates.sort_by_key(|group| (group.cluster.is_none(), group.cluster));
    aggregates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song(energy: f64, valence: f64, cluster: Option<i64>) -> SongRecord {
        SongRecord {
            id: format!("{}-{}", energy, valence),
            title: "t".to_string(),
            artist: "a".to_string(),
            energy,
            valence,
            danceability: 0.5,
            tempo: None,
            cluster,
        }
    }

    #[test]
    fn test_groups_and_means() {
        let records = vec![
            song(0.2, 0.8, Some(1)),
            song(0.9, 0.1, None),
            song(0.4, 0.6, Some(1)),
            song(0.7, 0.3, Some(0)),
        ];

        let groups = aggregate(&records);
        assert_eq!(groups.len(), 3);

        assert_eq!(groups[0].cluster, Some(0));
        assert_eq!(groups[0].size, 1);

        assert_eq!(groups[1].cluster, Some(1));
        assert_eq!(groups[1].size, 2);
        assert!((groups[1].centroid.energy - 0.3).abs() < 1e-9);
        assert!((groups[1].centroid.valence - 0.7).abs() < 1e-9);

        assert_eq!(groups[2].cluster, None);
        assert_eq!(groups[2].size, 1);
    }

    #[test]
    fn test_sizes_sum_to_population() {
        let records: Vec<_> = (0..17)
            .map(|i| song(i as f64 / 17.0, 0.5, if i % 4 == 0 { None } else { Some(i % 3) }))
            .collect();
        let total: i64 = aggregate(&records).iter().map(|g| g.size).sum();
        assert_eq!(total, 17);
    }

    #[test]
    fn test_empty_input() {
        assert!(aggregate(&[]).is_empty());
    }
}
