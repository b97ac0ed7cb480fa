//! Mood-space workflows over the song store
//!
//! - `clustering`: full-recompute k-means labelling
//! - `scoring`: distance-based recommendation
//! - `aggregate`: per-cluster centroids and sizes
//! - `playlist`: conjunctive cluster / range filter

pub mod aggregate;
pub mod clustering;
pub mod playlist;
pub mod scoring;

pub use aggregate::{aggregate, aggregate_clusters};
pub use clustering::{run_clustering, validate_k, ClusteringOutcome};
pub use playlist::{filter_playlist, PlaylistItem};
pub use scoring::{recommend, score_and_rank, RecommendRequest, ScoredSong, TargetSource};
