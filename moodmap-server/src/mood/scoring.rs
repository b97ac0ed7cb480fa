//! Mood scorer and ranker
//!
//! `score = 1 / (1e-6 + d)` where `d` is the Euclidean distance in
//! (energy, valence) to the target point. A song exactly on the target
//! scores about 1e6; the score is always positive and finite and strictly
//! decreasing in distance.

use moodmap_common::db::{songs, SongFilter, SongRecord};
use moodmap_common::{Error, MoodBox, MoodPoint, Result};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::debug;

pub const SCORE_EPSILON: f64 = 1e-6;

/// Distances past `f64::MAX` are clamped so the score never reaches zero.
pub fn mood_score(distance: f64) -> f64 {
    1.0 / (SCORE_EPSILON + distance.min(f64::MAX))
}

/// One ranked recommendation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredSong {
    pub song_id: String,
    pub title: String,
    pub score: f64,
}

/// Score every candidate against `target`, best first, at most `limit`.
///
/// The sort is stable: equal scores keep their candidate order.
pub fn score_and_rank(candidates: &[SongRecord], target: MoodPoint, limit: usize) -> Vec<ScoredSong> {
    let mut scored: Vec<ScoredSong> = candidates
        .iter()
        .map(|song| ScoredSong {
            song_id: song.id.clone(),
            title: song.title.clone(),
            score: mood_score(song.mood_point().distance(&target)),
        })
        .collect();

    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(limit);
    scored
}

/// Where the target point of a recommendation comes from
#[derive(Debug, Clone, PartialEq)]
pub enum TargetSource {
    /// A stored song's own (energy, valence)
    Seed(String),
    /// Center of a mood box
    MoodBox(MoodBox),
    /// (0.5, 0.5)
    Neutral,
}

impl TargetSource {
    /// A seed wins over a mood box; with neither, the neutral point.
    pub fn select(seed_song_id: Option<&str>, mood_box: Option<&MoodBox>) -> Self {
        match (seed_song_id, mood_box) {
            (Some(id), _) => TargetSource::Seed(id.to_string()),
            (None, Some(mood_box)) => TargetSource::MoodBox(*mood_box),
            (None, None) => TargetSource::Neutral,
        }
    }

    /// `None` when the seed song does not exist
    pub async fn resolve(&self, pool: &SqlitePool) -> Result<Option<MoodPoint>> {
        match self {
            TargetSource::Seed(id) => Ok(songs::get_song(pool, id)
                .await?
                .map(|song| song.mood_point())),
            TargetSource::MoodBox(mood_box) => Ok(Some(mood_box.center())),
            TargetSource::Neutral => Ok(Some(MoodPoint::NEUTRAL)),
        }
    }
}

/// Recommendation request shared by the POST and GET entry points
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendRequest {
    pub seed_song_id: Option<String>,
    /// Restricts candidates; also the target when no seed is given
    pub mood_box: Option<MoodBox>,
    pub k: usize,
}

/// Rank the songs inside the optional mood box against the resolved target.
///
/// The candidate pool is every matching song; the result holds at most
/// `k` items. An unknown seed yields an empty list.
pub async fn recommend(pool: &SqlitePool, request: &RecommendRequest) -> Result<Vec<ScoredSong>> {
    if request.k == 0 {
        return Err(Error::InvalidInput("k must be at least 1".to_string()));
    }

    let source = TargetSource::select(request.seed_song_id.as_deref(), request.mood_box.as_ref());
    let Some(target) = source.resolve(pool).await? else {
        debug!(?source, "Seed song not found, returning no recommendations");
        return Ok(Vec::new());
    };

    let filter = request
        .mood_box
        .as_ref()
        .map(SongFilter::from_mood_box)
        .unwrap_or_default();
    let candidates = songs::find_songs(pool, &filter, None).await?;

    debug!(
        candidates = candidates.len(),
        target_energy = target.energy,
        target_valence = target.valence,
        k = request.k,
        "Ranking candidates"
    );

    Ok(score_and_rank(&candidates, target, request.k))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song(id: &str, energy: f64, valence: f64) -> SongRecord {
        SongRecord {
            id: id.to_string(),
            title: id.to_string(),
            artist: "a".to_string(),
            energy,
            valence,
            danceability: 0.5,
            tempo: Some(120.0),
            cluster: None,
        }
    }

    #[test]
    fn test_score_properties() {
        let at_target = mood_score(0.0);
        assert!((at_target - 1e6).abs() < 1e-3);

        let mut previous = at_target;
        for step in 1..100 {
            let score = mood_score(step as f64 * 0.05);
            assert!(score.is_finite() && score > 0.0);
            assert!(score < previous);
            previous = score;
        }
    }

    #[test]
    fn test_closer_song_ranks_first() {
        let candidates = vec![song("B", 0.9, 0.1), song("A", 0.2, 0.8)];
        let ranked = score_and_rank(&candidates, MoodPoint::NEUTRAL, 10);

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].song_id, "A");
        assert_eq!(ranked[1].song_id, "B");
        assert!((ranked[0].score - mood_score(0.424_264)).abs() < 1e-2);
    }

    #[test]
    fn test_ties_keep_candidate_order() {
        // All four are the same distance from the neutral point
        let candidates = vec![
            song("first", 0.4, 0.5),
            song("second", 0.6, 0.5),
            song("third", 0.5, 0.4),
            song("fourth", 0.5, 0.6),
        ];
        let ranked = score_and_rank(&candidates, MoodPoint::NEUTRAL, 4);
        let ids: Vec<_> = ranked.iter().map(|s| s.song_id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second", "third", "fourth"]);
    }

    #[test]
    fn test_truncates_to_limit() {
        let candidates: Vec<_> = (0..10)
            .map(|i| song(&i.to_string(), i as f64 / 10.0, 0.5))
            .collect();
        assert_eq!(score_and_rank(&candidates, MoodPoint::NEUTRAL, 3).len(), 3);
        assert!(score_and_rank(&[], MoodPoint::NEUTRAL, 3).is_empty());
    }

    #[test]
    fn test_extreme_coordinates_score_positive_and_rank_last() {
        let candidates = vec![
            song("huge", 1e308, 1e308),
            song("max", f64::MAX, -f64::MAX),
            song("near", 0.5, 0.6),
        ];
        let ranked = score_and_rank(&candidates, MoodPoint::NEUTRAL, 3);

        assert_eq!(ranked[0].song_id, "near");
        for item in &ranked {
            assert!(item.score.is_finite(), "{} scored {}", item.song_id, item.score);
            assert!(item.score > 0.0, "{} scored {}", item.song_id, item.score);
        }
        assert!(ranked[1].score >= ranked[2].score);
    }

    #[test]
    fn test_target_selection() {
        let mood_box = MoodBox::new(0.0, 0.3, 0.7, 1.0);
        assert_eq!(
            TargetSource::select(Some("x"), Some(&mood_box)),
            TargetSource::Seed("x".to_string())
        );
        assert_eq!(
            TargetSource::select(None, Some(&mood_box)),
            TargetSource::MoodBox(mood_box)
        );
        assert_eq!(TargetSource::select(None, None), TargetSource::Neutral);
    }
}
