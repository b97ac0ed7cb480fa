//! Song persistence
//!
//! Store iteration order is insertion order (`created_at`, then `rowid`).

use crate::db::models::{ClusterAggregate, NewSong, SongFilter, SongRecord};
use crate::mood::MoodPoint;
use crate::Result;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use uuid::Uuid;

const SONG_COLUMNS: &str =
    "guid, title, artist, energy, valence, danceability, tempo, cluster";

fn song_from_row(row: &SqliteRow) -> SongRecord {
    SongRecord {
        id: row.get("guid"),
        title: row.get("title"),
        artist: row.get("artist"),
        energy: row.get("energy"),
        valence: row.get("valence"),
        danceability: row.get("danceability"),
        tempo: row.get("tempo"),
        cluster: row.get("cluster"),
    }
}

/// Insert a validated song and return it with its new id
pub async fn insert_song(pool: &SqlitePool, song: &NewSong) -> Result<SongRecord> {
    song.validate()?;

    let guid = Uuid::new_v4().to_string();
    sqlx::query(
        r#"
        INSERT INTO songs (guid, title, artist, energy, valence, danceability, tempo, cluster)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&guid)
    .bind(&song.title)
    .bind(&song.artist)
    .bind(song.energy)
    .bind(song.valence)
    .bind(song.danceability)
    .bind(song.tempo)
    .bind(song.cluster)
    .execute(pool)
    .await?;

    tracing::debug!(song_id = %guid, title = %song.title, "Inserted song");

    Ok(SongRecord {
        id: guid,
        title: song.title.clone(),
        artist: song.artist.clone(),
        energy: song.energy,
        valence: song.valence,
        danceability: song.danceability,
        tempo: song.tempo,
        cluster: song.cluster,
    })
}

/// Insert many songs in one transaction
pub async fn insert_songs(pool: &SqlitePool, songs: &[NewSong]) -> Result<usize> {
    for song in songs {
        song.validate()?;
    }

    let mut tx = pool.begin().await?;
    for song in songs {
        sqlx::query(
            r#"
            INSERT INTO songs (guid, title, artist, energy, valence, danceability, tempo, cluster)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&song.title)
        .bind(&song.artist)
        .bind(song.energy)
        .bind(song.valence)
        .bind(song.danceability)
        .bind(song.tempo)
        .bind(song.cluster)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    Ok(songs.len())
}

/// Load one song by id
pub async fn get_song(pool: &SqlitePool, id: &str) -> Result<Option<SongRecord>> {
    let sql = format!("SELECT {} FROM songs WHERE guid = ?", SONG_COLUMNS);
    let row = sqlx::query(&sql).bind(id).fetch_optional(pool).await?;
    Ok(row.as_ref().map(song_from_row))
}

/// Songs matching `filter` in store order, at most `limit` if given
pub async fn find_songs(
    pool: &SqlitePool,
    filter: &SongFilter,
    limit: Option<i64>,
) -> Result<Vec<SongRecord>> {
    let mut qb: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT {} FROM songs WHERE 1 = 1", SONG_COLUMNS));

    if let Some(cluster) = filter.cluster {
        qb.push(" AND cluster = ").push_bind(cluster);
    }
    if let Some((min, max)) = filter.energy {
        qb.push(" AND energy >= ").push_bind(min);
        qb.push(" AND energy <= ").push_bind(max);
    }
    if let Some((min, max)) = filter.valence {
        qb.push(" AND valence >= ").push_bind(min);
        qb.push(" AND valence <= ").push_bind(max);
    }

    qb.push(" ORDER BY created_at, rowid");

    if let Some(limit) = limit {
        qb.push(" LIMIT ").push_bind(limit);
    }

    let rows = qb.build().fetch_all(pool).await?;
    Ok(rows.iter().map(song_from_row).collect())
}

/// Every song in store order
pub async fn all_songs(pool: &SqlitePool) -> Result<Vec<SongRecord>> {
    find_songs(pool, &SongFilter::default(), None).await
}

pub async fn count_songs(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM songs")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Write cluster labels in one transaction, one UPDATE per record.
///
/// Ids that no longer exist are skipped; returns the number of rows updated.
pub async fn assign_clusters(pool: &SqlitePool, labels: &[(String, i64)]) -> Result<u64> {
    let mut tx = pool.begin().await?;
    let mut updated = 0;

    for (guid, cluster) in labels {
        let result = sqlx::query("UPDATE songs SET cluster = ? WHERE guid = ?")
            .bind(cluster)
            .bind(guid)
            .execute(&mut *tx)
            .await?;
        updated += result.rows_affected();
    }

    tx.commit().await?;
    Ok(updated)
}

/// Centroid (mean energy, mean valence) and size per cluster label,
/// including one group for unlabelled songs.
pub async fn aggregate_clusters(pool: &SqlitePool) -> Result<Vec<ClusterAggregate>> {
    let rows = sqlx::query(
        r#"
        SELECT cluster,
               AVG(energy) AS energy,
               AVG(valence) AS valence,
               COUNT(*) AS size
        FROM songs
        GROUP BY cluster
        ORDER BY cluster IS NULL, cluster
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .iter()
        .map(|row| ClusterAggregate {
            cluster: row.get("cluster"),
            centroid: MoodPoint::new(row.get("energy"), row.get("valence")),
            size: row.get("size"),
        })
        .collect())
}
