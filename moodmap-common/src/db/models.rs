//! Song store models

use crate::mood::{in_range, FeatureVector, MoodBox, MoodPoint, DEFAULT_TEMPO_BPM};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// A stored song and its mood features
///
/// `cluster` is derived data: the label from the most recent clustering
/// run, stale as soon as any feature vector changes without a re-run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SongRecord {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub energy: f64,
    pub valence: f64,
    pub danceability: f64,
    pub tempo: Option<f64>,
    pub cluster: Option<i64>,
}

impl SongRecord {
    pub fn mood_point(&self) -> MoodPoint {
        MoodPoint::new(self.energy, self.valence)
    }

    /// Clustering row: energy, valence, danceability, tempo (120 if absent)
    pub fn feature_row(&self) -> Vec<f64> {
        vec![
            self.energy,
            self.valence,
            self.danceability,
            self.tempo.unwrap_or(DEFAULT_TEMPO_BPM),
        ]
    }
}

/// A song about to be inserted; the store assigns the id
#[derive(Debug, Clone, PartialEq)]
pub struct NewSong {
    pub title: String,
    pub artist: String,
    pub energy: f64,
    pub valence: f64,
    pub danceability: f64,
    pub tempo: Option<f64>,
    pub cluster: Option<i64>,
}

impl NewSong {
    pub fn from_features(title: impl Into<String>, artist: impl Into<String>, features: &FeatureVector) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            energy: features.energy,
            valence: features.valence,
            danceability: features.danceability,
            tempo: Some(features.tempo),
            cluster: None,
        }
    }

    /// Refuse incomplete or non-numeric feature vectors at ingest
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("energy", self.energy),
            ("valence", self.valence),
            ("danceability", self.danceability),
        ] {
            if !value.is_finite() {
                return Err(Error::InvalidInput(format!(
                    "{} must be a finite number, got {}",
                    name, value
                )));
            }
        }

        if let Some(tempo) = self.tempo {
            if !tempo.is_finite() || tempo <= 0.0 {
                return Err(Error::InvalidInput(format!(
                    "tempo must be a positive number, got {}",
                    tempo
                )));
            }
        }

        Ok(())
    }
}

/// Conjunctive song filter; `None` fields impose no constraint
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SongFilter {
    pub cluster: Option<i64>,
    /// Inclusive energy range
    pub energy: Option<(f64, f64)>,
    /// Inclusive valence range
    pub valence: Option<(f64, f64)>,
}

impl SongFilter {
    /// Build from optional bounds. A range applies only when both of its
    /// bounds are present.
    pub fn from_bounds(
        cluster: Option<i64>,
        e_min: Option<f64>,
        e_max: Option<f64>,
        v_min: Option<f64>,
        v_max: Option<f64>,
    ) -> Self {
        Self {
            cluster,
            energy: e_min.zip(e_max),
            valence: v_min.zip(v_max),
        }
    }

    pub fn from_mood_box(mood_box: &MoodBox) -> Self {
        Self {
            cluster: None,
            energy: Some(mood_box.energy_range()),
            valence: Some(mood_box.valence_range()),
        }
    }

    /// In-memory equivalent of the SQL predicate
    pub fn matches(&self, song: &SongRecord) -> bool {
        if let Some(cluster) = self.cluster {
            if song.cluster != Some(cluster) {
                return false;
            }
        }
        if let Some(range) = self.energy {
            if !in_range(song.energy, range) {
                return false;
            }
        }
        if let Some(range) = self.valence {
            if !in_range(song.valence, range) {
                return false;
            }
        }
        true
    }
}

/// Per-cluster centroid and population
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterAggregate {
    /// `None` groups records never labelled by a clustering run
    pub cluster: Option<i64>,
    pub centroid: MoodPoint,
    pub size: i64,
}
