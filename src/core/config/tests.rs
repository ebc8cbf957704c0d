use super::data::Config;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_load_nonexistent_config() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("nonexistent_config.toml");

    let config = Config::load_from_path(&config_path).expect("Failed to load config");

    assert_eq!(config, Config::default());
    assert_eq!(config.bible_version(), "NIV");
    assert_eq!(config.language(), "en");
    assert_eq!(config.model(), "gemini-2.5-flash");
}

#[test]
fn test_config_persistence_lifecycle() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("nested").join("config.toml");

    let config = Config {
        bible_version: Some("KJV".to_string()),
        language: Some("es".to_string()),
        theme: Some("light".to_string()),
        data_dir: Some(PathBuf::from("/tmp/bible-data")),
        ..Default::default()
    };
    config
        .save_to_path(&config_path)
        .expect("Failed to save config");

    let mut loaded = Config::load_from_path(&config_path).expect("Failed to load config");
    assert_eq!(loaded, config);
    assert!(loaded.light_theme());

    loaded.theme = None;
    loaded.bible_version = None;
    loaded
        .save_to_path(&config_path)
        .expect("Failed to save config");
    let reloaded = Config::load_from_path(&config_path).expect("Failed to load config");
    assert_eq!(reloaded.bible_version(), "NIV");
    assert!(!reloaded.light_theme());
    assert_eq!(reloaded.language(), "es");
}

#[test]
fn unknown_version_falls_back_to_default() {
    let config = Config {
        bible_version: Some("nkjv".to_string()),
        ..Default::default()
    };
    assert_eq!(config.bible_version(), "NKJV");

    let config = Config {
        bible_version: Some("Vulgate".to_string()),
        ..Default::default()
    };
    assert_eq!(config.bible_version(), "NIV");
}

#[test]
fn invalid_toml_reports_parse_error() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "bible_version = [").expect("write");

    let err = Config::load_from_path(&config_path).expect_err("parse should fail");
    assert!(err.to_string().starts_with("Failed to parse config at"));
}

#[test]
fn explicit_data_dir_wins() {
    let config = Config {
        data_dir: Some(PathBuf::from("/srv/bible")),
        ..Default::default()
    };
    assert_eq!(
        config.resolve_data_dir().expect("data dir"),
        PathBuf::from("/srv/bible")
    );
}
