//! Database initialization
//!
//! The store is opened once at process start and the pool is handed to
//! every component; `close_database` releases it at shutdown.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Current schema version recorded in `schema_version`
pub const SCHEMA_VERSION: i64 = 1;

/// Open (creating if missing) the database and ensure the schema exists
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .min_connections(1)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // WAL lets readers proceed while a clustering run writes labels
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create tables and indexes (idempotent)
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_schema_version_table(pool).await?;
    create_songs_table(pool).await?;
    create_song_indexes(pool).await?;
    record_schema_version(pool).await?;
    Ok(())
}

/// Close the pool, waiting for in-flight queries
pub async fn close_database(pool: &SqlitePool) {
    pool.close().await;
    info!("Database connections closed");
}

async fn create_schema_version_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the songs table
///
/// Feature columns are NOT NULL so an incomplete record can never reach
/// clustering; `tempo` may be absent and defaults to 120 BPM there.
async fn create_songs_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS songs (
            guid TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            artist TEXT NOT NULL DEFAULT 'unknown',
            energy REAL NOT NULL,
            valence REAL NOT NULL,
            danceability REAL NOT NULL,
            tempo REAL,
            cluster INTEGER,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_song_indexes(pool: &SqlitePool) -> Result<()> {
    for (name, column) in [
        ("idx_songs_energy", "energy"),
        ("idx_songs_valence", "valence"),
        ("idx_songs_cluster", "cluster"),
    ] {
        let sql = format!("CREATE INDEX IF NOT EXISTS {} ON songs({})", name, column);
        sqlx::query(&sql).execute(pool).await?;
    }

    Ok(())
}

async fn record_schema_version(pool: &SqlitePool) -> Result<()> {
    sqlx::query("INSERT OR IGNORE INTO schema_version (version) VALUES (?)")
        .bind(SCHEMA_VERSION)
        .execute(pool)
        .await?;

    Ok(())
}
