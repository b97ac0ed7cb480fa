//! # moodmap common library
//!
//! Shared code for the moodmap services including:
//! - Song store schema and queries
//! - Mood-space types (points, boxes, feature vectors)
//! - K-means clustering
//! - Configuration loading and logging setup

pub mod config;
pub mod db;
pub mod error;
pub mod kmeans;
pub mod logging;
pub mod mood;

pub use error::{Error, Result};
pub use mood::{FeatureVector, MoodBox, MoodPoint};
