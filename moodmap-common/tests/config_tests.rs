//! Configuration loading and root folder resolution
//!
//! Tests that touch MOODMAP_* environment variables are #[serial] so they
//! never run in parallel with each other.

use moodmap_common::config::{
    CompiledDefaults, RootFolderInitializer, RootFolderResolver, TomlConfig, MUSICGEN_URL_ENV,
    PORT_ENV, ROOT_FOLDER_ENV,
};
use serial_test::serial;
use std::env;
use std::path::PathBuf;

#[test]
fn test_defaults_when_toml_empty() {
    let config = TomlConfig::from_toml_str("").unwrap();
    assert_eq!(config.port, 8000);
    assert_eq!(config.bind_address, "127.0.0.1");
    assert_eq!(config.app_name, "RhythmX");
    assert_eq!(config.logging.level, "info");
    assert!(config.logging.file.is_none());
    assert!(config.music_gen.endpoint.is_none());
    assert_eq!(config.music_gen.timeout_secs, 120);
    assert!(config
        .cors_origins
        .contains(&"http://localhost:5173".to_string()));
}

#[test]
fn test_partial_toml_keeps_other_defaults() {
    let config = TomlConfig::from_toml_str(
        r#"
        port = 9100
        root_folder = "/srv/moodmap"

        [logging]
        level = "debug"

        [music_gen]
        endpoint = "http://gpu-box:9000/generate"
        "#,
    )
    .unwrap();

    assert_eq!(config.port, 9100);
    assert_eq!(config.root_folder, Some(PathBuf::from("/srv/moodmap")));
    assert_eq!(config.logging.level, "debug");
    assert_eq!(
        config.music_gen.endpoint.as_deref(),
        Some("http://gpu-box:9000/generate")
    );
    assert_eq!(config.music_gen.timeout_secs, 120);
    assert_eq!(config.bind_address, "127.0.0.1");
}

#[test]
fn test_malformed_toml_is_an_error() {
    assert!(TomlConfig::from_toml_str("port = \"not a number\"").is_err());
}

#[test]
fn test_explicit_missing_file_is_an_error() {
    let result = TomlConfig::load("moodmap-test", Some(&PathBuf::from("/nonexistent/moodmap.toml")));
    assert!(result.is_err());
}

#[test]
#[serial]
fn test_explicit_file_with_env_overrides() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("server.toml");
    std::fs::write(&path, "port = 7000\n").unwrap();

    env::set_var(PORT_ENV, "7100");
    env::set_var(MUSICGEN_URL_ENV, "http://localhost:9999/generate");

    let config = TomlConfig::load("moodmap-test", Some(&path)).unwrap();
    assert_eq!(config.port, 7100);
    assert_eq!(
        config.music_gen.endpoint.as_deref(),
        Some("http://localhost:9999/generate")
    );

    env::remove_var(PORT_ENV);
    env::remove_var(MUSICGEN_URL_ENV);
}

#[test]
#[serial]
fn test_invalid_port_env_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("server.toml");
    std::fs::write(&path, "port = 7000\n").unwrap();

    env::set_var(PORT_ENV, "not-a-port");
    let config = TomlConfig::load("moodmap-test", Some(&path)).unwrap();
    assert_eq!(config.port, 7000);
    env::remove_var(PORT_ENV);
}

#[test]
#[serial]
fn test_resolver_with_no_overrides_uses_default() {
    env::remove_var(ROOT_FOLDER_ENV);

    let root_folder = RootFolderResolver::new("test-module").resolve();
    assert_eq!(root_folder, CompiledDefaults::for_current_platform().root_folder);
}

#[test]
#[serial]
fn test_resolver_priority_order() {
    let config = TomlConfig::from_toml_str("root_folder = \"/tmp/moodmap-from-toml\"").unwrap();

    env::remove_var(ROOT_FOLDER_ENV);
    let from_toml = RootFolderResolver::new("test-module")
        .with_toml(&config)
        .resolve();
    assert_eq!(from_toml, PathBuf::from("/tmp/moodmap-from-toml"));

    env::set_var(ROOT_FOLDER_ENV, "/tmp/moodmap-from-env");
    let from_env = RootFolderResolver::new("test-module")
        .with_toml(&config)
        .resolve();
    assert_eq!(from_env, PathBuf::from("/tmp/moodmap-from-env"));

    let from_cli = RootFolderResolver::new("test-module")
        .with_toml(&config)
        .with_cli_arg(Some(PathBuf::from("/tmp/moodmap-from-cli")))
        .resolve();
    assert_eq!(from_cli, PathBuf::from("/tmp/moodmap-from-cli"));

    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
fn test_initializer_creates_folder_and_database_path() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("nested").join("moodmap");
    let initializer = RootFolderInitializer::new(root.clone());

    initializer.ensure_directory_exists().unwrap();
    assert!(root.is_dir());

    let config = TomlConfig::default();
    assert_eq!(initializer.database_path(&config), root.join("moodmap.db"));

    let relative = TomlConfig::from_toml_str("database_path = \"custom.db\"").unwrap();
    assert_eq!(initializer.database_path(&relative), root.join("custom.db"));

    let absolute = TomlConfig::from_toml_str("database_path = \"/var/tmp/x.db\"").unwrap();
    assert_eq!(initializer.database_path(&absolute), PathBuf::from("/var/tmp/x.db"));
}
