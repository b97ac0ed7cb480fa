//! Sample data loader
//!
//! Inserts `--count` songs with random mood features into the configured
//! database, for trying out clustering and recommendation without audio.
//!
//! ```bash
//! seed-songs --count 50
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use moodmap_common::config::{RootFolderInitializer, RootFolderResolver, TomlConfig};
use moodmap_common::db::{close_database, init_database, songs, NewSong};
use moodmap_common::logging::init_tracing;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "seed-songs")]
#[command(about = "Insert sample songs with random mood features")]
struct Args {
    /// Number of songs to insert
    #[arg(long, default_value = "50")]
    count: usize,

    /// Root folder holding the database
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// Explicit TOML config file (shared with moodmap-server)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// RNG seed for reproducible data
    #[arg(long)]
    seed: Option<u64>,
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

fn sample_songs(count: usize, rng: &mut impl Rng) -> Vec<NewSong> {
    (0..count)
        .map(|i| NewSong {
            title: format!("Sample Track {}", i),
            artist: format!("Artist {}", i % 10),
            energy: round3(rng.gen::<f64>()),
            valence: round3(rng.gen::<f64>()),
            danceability: round3(rng.gen::<f64>()),
            tempo: Some(round3(rng.gen_range(60.0..180.0))),
            cluster: None,
        })
        .collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = TomlConfig::load("moodmap-server", args.config.as_deref())?;
    init_tracing(&config.logging)?;

    let root_folder = RootFolderResolver::new("seed-songs")
        .with_cli_arg(args.root_folder)
        .with_toml(&config)
        .resolve();
    let initializer = RootFolderInitializer::new(root_folder);
    initializer.ensure_directory_exists()?;

    let pool = init_database(&initializer.database_path(&config))
        .await
        .context("Failed to open database")?;

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let batch = sample_songs(args.count, &mut rng);
    let inserted = songs::insert_songs(&pool, &batch).await?;
    let total = songs::count_songs(&pool).await?;

    info!("Inserted {} sample songs ({} total)", inserted, total);
    close_database(&pool).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_songs_shape() {
        let mut rng = StdRng::seed_from_u64(1);
        let batch = sample_songs(12, &mut rng);

        assert_eq!(batch.len(), 12);
        assert_eq!(batch[0].title, "Sample Track 0");
        assert_eq!(batch[11].artist, "Artist 1");

        for song in &batch {
            assert!(song.validate().is_ok());
            assert!((0.0..=1.0).contains(&song.energy));
            let tempo = song.tempo.unwrap();
            assert!((60.0..=180.0).contains(&tempo));
            assert_eq!(round3(song.valence), song.valence);
        }
    }
}
