//! Playlist-by-mood filter
//!
//! Every supplied criterion must hold (cluster equality, inclusive
//! energy/valence ranges); results follow store order.

use moodmap_common::db::{songs, SongFilter, SongRecord};
use moodmap_common::{Error, Result};
use serde::Serialize;
use sqlx::SqlitePool;

pub const DEFAULT_PLAYLIST_SIZE: i64 = 20;

/// Playlist projection of a song
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaylistItem {
    pub song_id: String,
    pub title: String,
    pub energy: f64,
    pub valence: f64,
}

impl From<SongRecord> for PlaylistItem {
    fn from(song: SongRecord) -> Self {
        Self {
            song_id: song.id,
            title: song.title,
            energy: song.energy,
            valence: song.valence,
        }
    }
}

/// At most `limit` songs matching `filter`
pub async fn filter_playlist(
    pool: &SqlitePool,
    filter: &SongFilter,
    limit: i64,
) -> Result<Vec<PlaylistItem>> {
    if limit < 1 {
        return Err(Error::InvalidInput(format!(
            "k must be at least 1, got {}",
            limit
        )));
    }

    let records = songs::find_songs(pool, filter, Some(limit)).await?;
    Ok(records.into_iter().map(PlaylistItem::from).collect())
}
