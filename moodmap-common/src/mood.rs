//! Mood-space types
//!
//! Mood space is the 2-D (energy, valence) plane used for similarity and
//! filtering. The full feature vector adds danceability and tempo.

use serde::{Deserialize, Serialize};

/// Tempo substituted during clustering when a record carries none
pub const DEFAULT_TEMPO_BPM: f64 = 120.0;

/// A point in mood space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoodPoint {
    pub energy: f64,
    pub valence: f64,
}

impl MoodPoint {
    /// Center of mood space, used when no target is given
    pub const NEUTRAL: MoodPoint = MoodPoint {
        energy: 0.5,
        valence: 0.5,
    };

    pub fn new(energy: f64, valence: f64) -> Self {
        Self { energy, valence }
    }

    /// Euclidean distance in (energy, valence)
    ///
    /// `hypot` avoids squaring, so far-apart finite points stay finite.
    pub fn distance(&self, other: &MoodPoint) -> f64 {
        let de = self.energy - other.energy;
        let dv = self.valence - other.valence;
        de.hypot(dv)
    }
}

impl Default for MoodPoint {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

/// Axis-aligned rectangle in mood space
///
/// On the wire a mood box is the array `[e_min, e_max, v_min, v_max]`.
/// Bounds are inclusive; filtering goes through `SongFilter::from_mood_box`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct MoodBox {
    pub e_min: f64,
    pub e_max: f64,
    pub v_min: f64,
    pub v_max: f64,
}

impl MoodBox {
    pub fn new(e_min: f64, e_max: f64, v_min: f64, v_max: f64) -> Self {
        Self {
            e_min,
            e_max,
            v_min,
            v_max,
        }
    }

    /// Midpoint of both ranges
    pub fn center(&self) -> MoodPoint {
        MoodPoint {
            energy: (self.e_min + self.e_max) / 2.0,
            valence: (self.v_min + self.v_max) / 2.0,
        }
    }

    /// Energy range as an inclusive (min, max) pair
    pub fn energy_range(&self) -> (f64, f64) {
        (self.e_min, self.e_max)
    }

    /// Valence range as an inclusive (min, max) pair
    pub fn valence_range(&self) -> (f64, f64) {
        (self.v_min, self.v_max)
    }
}

impl From<[f64; 4]> for MoodBox {
    fn from(b: [f64; 4]) -> Self {
        Self::new(b[0], b[1], b[2], b[3])
    }
}

impl From<MoodBox> for [f64; 4] {
    fn from(b: MoodBox) -> Self {
        [b.e_min, b.e_max, b.v_min, b.v_max]
    }
}

/// Feature vector extracted from audio
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub energy: f64,
    pub valence: f64,
    pub danceability: f64,
    /// Beats per minute
    pub tempo: f64,
}

/// Whether `value` lies in the inclusive range
pub fn in_range(value: f64, (min, max): (f64, f64)) -> bool {
    value >= min && value <= max
}
