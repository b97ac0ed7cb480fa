//! Song store tests against a throwaway SQLite file

use moodmap_common::db::{init_database, songs, NewSong, SongFilter};
use sqlx::SqlitePool;
use tempfile::TempDir;

async fn setup_db() -> (TempDir, SqlitePool) {
    let dir = tempfile::tempdir().expect("temp dir");
    let pool = init_database(&dir.path().join("moodmap.db"))
        .await
        .expect("database init");
    (dir, pool)
}

fn new_song(title: &str, energy: f64, valence: f64) -> NewSong {
    NewSong {
        title: title.to_string(),
        artist: "Tester".to_string(),
        energy,
        valence,
        danceability: 0.5,
        tempo: Some(110.0),
        cluster: None,
    }
}

#[tokio::test]
async fn test_schema_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("moodmap.db");

    let first = init_database(&path).await.unwrap();
    songs::insert_song(&first, &new_song("A", 0.2, 0.8)).await.unwrap();
    first.close().await;

    let second = init_database(&path).await.unwrap();
    assert_eq!(songs::count_songs(&second).await.unwrap(), 1);

    let indexes: Vec<String> = sqlx::query_scalar(
        "SELECT name FROM sqlite_master WHERE type = 'index' AND tbl_name = 'songs' ORDER BY name",
    )
    .fetch_all(&second)
    .await
    .unwrap();
    assert!(indexes.contains(&"idx_songs_energy".to_string()));
    assert!(indexes.contains(&"idx_songs_valence".to_string()));
    assert!(indexes.contains(&"idx_songs_cluster".to_string()));
}

#[tokio::test]
async fn test_insert_and_get() {
    let (_dir, pool) = setup_db().await;

    let stored = songs::insert_song(&pool, &new_song("A", 0.2, 0.8)).await.unwrap();
    assert!(!stored.id.is_empty());
    assert!(stored.cluster.is_none());

    let loaded = songs::get_song(&pool, &stored.id).await.unwrap().unwrap();
    assert_eq!(loaded, stored);

    assert!(songs::get_song(&pool, "missing").await.unwrap().is_none());
}

#[tokio::test]
async fn test_insert_rejects_incomplete_features() {
    let (_dir, pool) = setup_db().await;

    let mut bad = new_song("bad", 0.2, 0.8);
    bad.energy = f64::NAN;
    assert!(songs::insert_song(&pool, &bad).await.is_err());
    assert_eq!(songs::count_songs(&pool).await.unwrap(), 0);
}

#[tokio::test]
async fn test_find_songs_filters_inclusively() {
    let (_dir, pool) = setup_db().await;
    songs::insert_song(&pool, &new_song("A", 0.2, 0.8)).await.unwrap();
    songs::insert_song(&pool, &new_song("B", 0.9, 0.1)).await.unwrap();
    songs::insert_song(&pool, &new_song("edge", 0.3, 0.7)).await.unwrap();

    let filter = SongFilter::from_bounds(None, Some(0.0), Some(0.3), Some(0.7), Some(1.0));
    let found = songs::find_songs(&pool, &filter, None).await.unwrap();
    let titles: Vec<_> = found.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["A", "edge"]);

    let all = songs::find_songs(&pool, &SongFilter::default(), Some(2)).await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].title, "A");
    assert_eq!(all[1].title, "B");
}

#[tokio::test]
async fn test_assign_clusters_and_aggregate() {
    let (_dir, pool) = setup_db().await;
    let a = songs::insert_song(&pool, &new_song("A", 0.2, 0.8)).await.unwrap();
    let b = songs::insert_song(&pool, &new_song("B", 0.4, 0.6)).await.unwrap();
    songs::insert_song(&pool, &new_song("C", 0.9, 0.1)).await.unwrap();

    let updated = songs::assign_clusters(
        &pool,
        &[(a.id.clone(), 0), (b.id.clone(), 0), ("gone".to_string(), 1)],
    )
    .await
    .unwrap();
    assert_eq!(updated, 2);

    let groups = songs::aggregate_clusters(&pool).await.unwrap();
    assert_eq!(groups.len(), 2);

    let labelled = groups.iter().find(|g| g.cluster == Some(0)).unwrap();
    assert_eq!(labelled.size, 2);
    assert!((labelled.centroid.energy - 0.3).abs() < 1e-9);
    assert!((labelled.centroid.valence - 0.7).abs() < 1e-9);

    let unlabelled = groups.iter().find(|g| g.cluster.is_none()).unwrap();
    assert_eq!(unlabelled.size, 1);
    assert!((unlabelled.centroid.energy - 0.9).abs() < 1e-9);

    let filter = SongFilter {
        cluster: Some(0),
        ..Default::default()
    };
    assert_eq!(songs::find_songs(&pool, &filter, None).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_insert_songs_batch() {
    let (_dir, pool) = setup_db().await;
    let batch: Vec<NewSong> = (0..5)
        .map(|i| new_song(&format!("Track {}", i), i as f64 / 5.0, 0.5))
        .collect();

    assert_eq!(songs::insert_songs(&pool, &batch).await.unwrap(), 5);
    let all = songs::all_songs(&pool).await.unwrap();
    assert_eq!(all.len(), 5);
    assert_eq!(all[0].title, "Track 0");
    assert_eq!(all[4].title, "Track 4");
}
