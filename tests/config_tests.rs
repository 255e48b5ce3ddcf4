// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for configuration module

use qr_analyzer::Config;
use qr_analyzer::backends::camera::CameraBackendType;
use qr_analyzer::errors::AppError;

#[test]
fn test_config_default() {
    let config = Config::default();

    assert_eq!(config.camera_backend, CameraBackendType::V4l2);
    assert_eq!(config.log_filter, "warn");
    assert_eq!(config.max_surface_dimension, 16_384);
    assert!(config.camera_path.is_none());
    assert!(config.clipboard_command.is_none());
}

#[test]
fn test_config_missing_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::load_from(&dir.path().join("absent.json")).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_config_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.json");

    let config = Config {
        camera_backend: CameraBackendType::File,
        camera_path: Some("/tmp/qr.png".to_string()),
        camera_warmup_ms: 0,
        ..Config::default()
    };
    config.save_to(&path).unwrap();

    assert_eq!(Config::load_from(&path).unwrap(), config);
}

#[test]
fn test_config_partial_file_fills_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{ "camera_backend": "file", "log_filter": "debug" }"#).unwrap();

    let config = Config::load_from(&path).unwrap();
    assert_eq!(config.camera_backend, CameraBackendType::File);
    assert_eq!(config.log_filter, "debug");
    assert_eq!(config.camera_format, Config::default().camera_format);
}

#[test]
fn test_config_invalid_json_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{ not json").unwrap();

    assert!(matches!(Config::load_from(&path), Err(AppError::Config(_))));
}
