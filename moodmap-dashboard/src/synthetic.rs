//! Synthetic mood dataset for the dashboard
//!
//! 400 tracks with uniformly random (energy, valence) from a fixed seed,
//! so every dashboard session sees the same map.

use moodmap_common::mood::in_range;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

pub const DATASET_SIZE: usize = 400;
pub const DATASET_SEED: u64 = 7;
pub const ARTISTS: [&str; 4] = ["Indie Echo", "LoWave", "Nocturne Lab", "VibeCraft"];
pub const PLAYLIST_SIZE: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntheticTrack {
    pub title: String,
    pub artist: String,
    pub energy: f64,
    pub valence: f64,
}

/// Deterministic dataset of `size` tracks
pub fn generate(size: usize, seed: u64) -> Vec<SyntheticTrack> {
    let mut rng = StdRng::seed_from_u64(seed);
    let energies: Vec<f64> = (0..size).map(|_| rng.gen()).collect();
    let valences: Vec<f64> = (0..size).map(|_| rng.gen()).collect();

    (0..size)
        .map(|i| SyntheticTrack {
            title: format!("Track {}", i),
            artist: ARTISTS[rng.gen_range(0..ARTISTS.len())].to_string(),
            energy: energies[i],
            valence: valences[i],
        })
        .collect()
}

/// Inclusive energy and valence ranges; the default admits everything
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeFilter {
    pub e_min: f64,
    pub e_max: f64,
    pub v_min: f64,
    pub v_max: f64,
}

impl Default for RangeFilter {
    fn default() -> Self {
        Self {
            e_min: 0.0,
            e_max: 1.0,
            v_min: 0.0,
            v_max: 1.0,
        }
    }
}

impl RangeFilter {
    pub fn matches(&self, track: &SyntheticTrack) -> bool {
        in_range(track.energy, (self.e_min, self.e_max))
            && in_range(track.valence, (self.v_min, self.v_max))
    }

    pub fn apply<'a>(&self, tracks: &'a [SyntheticTrack]) -> Vec<&'a SyntheticTrack> {
        tracks.iter().filter(|t| self.matches(t)).collect()
    }
}

/// Random playlist of at most `size` tracks, in random order
pub fn sample_playlist<'a, R: Rng + ?Sized>(
    tracks: &[&'a SyntheticTrack],
    size: usize,
    rng: &mut R,
) -> Vec<&'a SyntheticTrack> {
    tracks
        .choose_multiple(rng, size.min(tracks.len()))
        .copied()
        .collect()
}

/// CSV with header `title,artist,energy,valence`
pub fn playlist_csv(tracks: &[&SyntheticTrack]) -> String {
    let mut out = String::from("title,artist,energy,valence\n");
    for track in tracks {
        out.push_str(&format!(
            "{},{},{},{}\n",
            csv_field(&track.title),
            csv_field(&track.artist),
            track.energy,
            track.valence
        ));
    }
    out
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_is_deterministic() {
        let a = generate(DATASET_SIZE, DATASET_SEED);
        let b = generate(DATASET_SIZE, DATASET_SEED);
        assert_eq!(a, b);
        assert_eq!(a.len(), 400);
        assert_eq!(a[0].title, "Track 0");
        assert_eq!(a[399].title, "Track 399");
        assert!(a.iter().all(|t| ARTISTS.contains(&t.artist.as_str())));
        assert!(a
            .iter()
            .all(|t| (0.0..1.0).contains(&t.energy) && (0.0..1.0).contains(&t.valence)));
    }

    #[test]
    fn test_filter_is_inclusive() {
        let tracks = vec![
            SyntheticTrack {
                title: "edge".into(),
                artist: "LoWave".into(),
                energy: 0.3,
                valence: 0.7,
            },
            SyntheticTrack {
                title: "out".into(),
                artist: "LoWave".into(),
                energy: 0.31,
                valence: 0.7,
            },
        ];
        let filter = RangeFilter {
            e_min: 0.0,
            e_max: 0.3,
            v_min: 0.7,
            v_max: 1.0,
        };
        let kept = filter.apply(&tracks);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].title, "edge");
    }

    #[test]
    fn test_default_filter_keeps_everything() {
        let tracks = generate(50, 1);
        assert_eq!(RangeFilter::default().apply(&tracks).len(), 50);
    }

    #[test]
    fn test_sample_is_bounded_and_unique() {
        let tracks = generate(DATASET_SIZE, DATASET_SEED);
        let all: Vec<_> = tracks.iter().collect();
        let mut rng = StdRng::seed_from_u64(3);

        let playlist = sample_playlist(&all, PLAYLIST_SIZE, &mut rng);
        assert_eq!(playlist.len(), 20);
        let mut titles: Vec<_> = playlist.iter().map(|t| t.title.clone()).collect();
        titles.sort();
        titles.dedup();
        assert_eq!(titles.len(), 20);

        let few = &all[..5];
        assert_eq!(sample_playlist(few, PLAYLIST_SIZE, &mut rng).len(), 5);
    }

    #[test]
    fn test_csv_output() {
        let track = SyntheticTrack {
            title: "Track, \"live\"".into(),
            artist: "VibeCraft".into(),
            energy: 0.5,
            valence: 0.25,
        };
        let csv = playlist_csv(&[&track]);
        assert_eq!(
            csv,
            "title,artist,energy,valence\n\"Track, \"\"live\"\"\",VibeCraft,0.5,0.25\n"
        );
        assert_eq!(playlist_csv(&[]), "title,artist,energy,valence\n");
    }
}
