use std::{fs, path::PathBuf};

use recordbook_config::{Config, ConfigError, ConfigManager};
use tempfile::tempdir;

#[test]
fn default_config_points_at_records_file() {
    let cfg = Config::default();

    assert_eq!(cfg.log_filter, "recordbook=info");
    assert_eq!(cfg.reversal_prefix, "Reversal: ");
    assert!(cfg.ui_color_enabled);
    assert!(cfg.resolve_store_path().ends_with("recordbook/records.json"));
}

#[test]
fn explicit_store_path_wins_over_default() {
    let cfg = Config {
        store_path: Some(PathBuf::from("/srv/books/main.json")),
        ..Config::default()
    };

    assert_eq!(cfg.resolve_store_path(), PathBuf::from("/srv/books/main.json"));
}

#[test]
fn config_manager_persists_and_loads_config() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).expect("manager");

    let mut cfg = Config::default();
    cfg.store_path = Some(dir.path().join("books.json"));
    cfg.reversal_prefix = "Storno: ".to_string();
    cfg.ui_color_enabled = false;

    manager.save(&cfg).expect("save config");
    let loaded = manager.load().expect("load config");

    assert_eq!(loaded, cfg);
    assert!(manager.config_path().ends_with("config/config.json"));
}

#[test]
fn missing_fields_fall_back_to_defaults() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{ "log_filter": "recordbook=debug" }"#).expect("write config");

    let loaded = ConfigManager::new(path).load().expect("load config");

    assert_eq!(loaded.log_filter, "recordbook=debug");
    assert_eq!(loaded.reversal_prefix, Config::default_reversal_prefix());
    assert_eq!(loaded.store_path, None);
}

#[test]
fn blank_reversal_prefix_is_rejected() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::new(dir.path().join("config.json"));
    let cfg = Config {
        reversal_prefix: "  ".into(),
        ..Config::default()
    };

    let err = manager.save(&cfg).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { key: "reversal_prefix", .. }));
    assert!(!manager.config_path().exists());
}

#[test]
fn malformed_file_reports_serde_error() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("config.json");
    fs::write(&path, "[1, 2").expect("write config");

    let err = ConfigManager::new(path).load().unwrap_err();
    assert!(matches!(err, ConfigError::Serde(_)));
}
