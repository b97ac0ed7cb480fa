//! Error types shared by the moodmap crates

use thiserror::Error;

/// Result alias used by store, config and clustering code
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the song store and shared plumbing
#[derive(Error, Debug)]
pub enum Error {
    /// SQLite failure (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Filesystem failure while preparing the root folder or reading config
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML file present but unparseable
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration value missing or out of range
    #[error("Configuration error: {0}")]
    Config(String),

    /// Rejected before execution (bad `k`, incomplete feature vector, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Unexpected failure, e.g. a blocking task that panicked
    #[error("Internal error: {0}")]
    Internal(String),
}
