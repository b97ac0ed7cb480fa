//! Configuration loading and root folder resolution
//!
//! Each service reads an optional TOML bootstrap file. A missing file is not
//! an error: the service logs a warning and starts with compiled defaults.
//!
//! Root folder priority order:
//! 1. Command-line argument (highest priority)
//! 2. `MOODMAP_ROOT_FOLDER` environment variable
//! 3. TOML `root_folder`
//! 4. OS-dependent compiled default

use crate::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "MOODMAP_ROOT_FOLDER";
/// Environment variable overriding the HTTP port
pub const PORT_ENV: &str = "MOODMAP_PORT";
/// Environment variable overriding the generative model endpoint
pub const MUSICGEN_URL_ENV: &str = "MOODMAP_MUSICGEN_URL";

/// Database file name inside the root folder
pub const DATABASE_FILE_NAME: &str = "moodmap.db";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Folder holding the database (and log file, if relative)
    pub root_folder: Option<PathBuf>,
    /// Overrides `<root_folder>/moodmap.db`
    pub database_path: Option<PathBuf>,
    pub bind_address: String,
    pub port: u16,
    /// Name reported by `GET /`
    pub app_name: String,
    /// Origins allowed by the CORS layer
    pub cors_origins: Vec<String>,
    /// Largest accepted upload for feature extraction
    pub max_upload_bytes: usize,
    pub logging: LoggingConfig,
    pub music_gen: MusicGenConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            root_folder: None,
            database_path: None,
            bind_address: "127.0.0.1".to_string(),
            port: 8000,
            app_name: "RhythmX".to_string(),
            cors_origins: vec![
                "http://localhost:5173".to_string(),
                "http://localhost:3000".to_string(),
                "http://localhost:3001".to_string(),
            ],
            max_upload_bytes: 50 * 1024 * 1024,
            logging: LoggingConfig::default(),
            music_gen: MusicGenConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level or filter directive (trace, debug, info, warn, error)
    pub level: String,
    /// Log file path (logs to stderr if not specified)
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

/// Generative audio inference endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MusicGenConfig {
    /// Inference URL; generation is disabled when unset
    pub endpoint: Option<String>,
    pub timeout_secs: u64,
}

impl Default for MusicGenConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_secs: 120,
        }
    }
}

impl TomlConfig {
    /// Load configuration for `module_name`.
    ///
    /// An explicit path must exist and parse. Without one, the platform
    /// config locations are tried and a missing file falls back to defaults.
    /// Environment overrides are applied last.
    pub fn load(module_name: &str, explicit_path: Option<&Path>) -> Result<Self> {
        let mut config = match explicit_path {
            Some(path) => Self::from_file(path)?,
            None => match find_config_file(module_name) {
                Some(path) => Self::from_file(&path)?,
                None => {
                    warn!(
                        "No config file found for {}, using built-in defaults",
                        module_name
                    );
                    Self::default()
                }
            },
        };

        config.apply_env_overrides();
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(port) = std::env::var(PORT_ENV) {
            match port.parse::<u16>() {
                Ok(p) => self.port = p,
                Err(_) => warn!("Ignoring invalid {}={}", PORT_ENV, port),
            }
        }

        if let Ok(url) = std::env::var(MUSICGEN_URL_ENV) {
            if !url.trim().is_empty() {
                self.music_gen.endpoint = Some(url);
            }
        }
    }
}

/// Config file locations in lookup order for the current platform
pub fn config_file_candidates(module_name: &str) -> Vec<PathBuf> {
    let file_name = format!("{}.toml", module_name);
    let mut candidates = Vec::new();

    if let Some(dir) = dirs::config_dir() {
        candidates.push(dir.join("moodmap").join(&file_name));
    }
    if cfg!(target_os = "linux") {
        candidates.push(PathBuf::from("/etc/moodmap").join(&file_name));
    }

    candidates
}

fn find_config_file(module_name: &str) -> Option<PathBuf> {
    config_file_candidates(module_name)
        .into_iter()
        .find(|p| p.exists())
}

/// Platform defaults used when nothing else is configured
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub root_folder: PathBuf,
    pub log_level: String,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        let root_folder = dirs::data_local_dir()
            .map(|d| d.join("moodmap"))
            .unwrap_or_else(|| PathBuf::from("./moodmap_data"));

        Self {
            root_folder,
            log_level: "info".to_string(),
        }
    }
}

/// Resolves the root folder from CLI, environment, TOML and defaults
#[derive(Debug, Clone)]
pub struct RootFolderResolver {
    module_name: String,
    cli_arg: Option<PathBuf>,
    toml_value: Option<PathBuf>,
}

impl RootFolderResolver {
    pub fn new(module_name: &str) -> Self {
        Self {
            module_name: module_name.to_string(),
            cli_arg: None,
            toml_value: None,
        }
    }

    pub fn with_cli_arg(mut self, path: Option<PathBuf>) -> Self {
        self.cli_arg = path;
        self
    }

    pub fn with_toml(mut self, config: &TomlConfig) -> Self {
        self.toml_value = config.root_folder.clone();
        self
    }

    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.cli_arg {
            info!("[{}] Root folder from command line: {}", self.module_name, path.display());
            return path.clone();
        }

        if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
            if !path.trim().is_empty() {
                info!("[{}] Root folder from {}: {}", self.module_name, ROOT_FOLDER_ENV, path);
                return PathBuf::from(path);
            }
        }

        if let Some(path) = &self.toml_value {
            info!("[{}] Root folder from config file: {}", self.module_name, path.display());
            return path.clone();
        }

        let defaults = CompiledDefaults::for_current_platform();
        info!(
            "[{}] Root folder from compiled default: {}",
            self.module_name,
            defaults.root_folder.display()
        );
        defaults.root_folder
    }
}

/// Prepares the resolved root folder
#[derive(Debug, Clone)]
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    pub fn root_folder(&self) -> &Path {
        &self.root_folder
    }

    pub fn ensure_directory_exists(&self) -> Result<()> {
        if !self.root_folder.exists() {
            std::fs::create_dir_all(&self.root_folder)?;
            info!("Created root folder: {}", self.root_folder.display());
        }
        Ok(())
    }

    /// `<root>/moodmap.db` unless the config names a database path.
    /// Relative overrides are taken relative to the root folder.
    pub fn database_path(&self, config: &TomlConfig) -> PathBuf {
        match &config.database_path {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => self.root_folder.join(path),
            None => self.root_folder.join(DATABASE_FILE_NAME),
        }
    }
}
