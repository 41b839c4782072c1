//! Configuration loading and API key resolution tests
//!
//! Tests that touch ETD_ALMA_API_KEY or ETD_CONFIG are marked #[serial]
//! so they never race on process environment.

use etd_common::config::{
    load_config, load_toml_config, resolve_api_key, TomlConfig, API_KEY_ENV_VAR, CONFIG_ENV_VAR,
};
use etd_common::Error;
use serial_test::serial;
use std::path::PathBuf;
use tempfile::TempDir;

fn config_with_key(key: Option<&str>) -> TomlConfig {
    let mut config = TomlConfig::default();
    config.alma.api_key = key.map(str::to_string);
    config
}

#[test]
#[serial]
fn test_env_key_overrides_toml() {
    std::env::set_var(API_KEY_ENV_VAR, "env-key");

    let result = resolve_api_key(&config_with_key(Some("toml-key"))).unwrap();
    assert_eq!(result, "env-key");

    std::env::remove_var(API_KEY_ENV_VAR);
}

#[test]
#[serial]
fn test_toml_fallback_when_env_missing() {
    std::env::remove_var(API_KEY_ENV_VAR);

    let result = resolve_api_key(&config_with_key(Some("toml-key"))).unwrap();
    assert_eq!(result, "toml-key");
}

#[test]
#[serial]
fn test_blank_env_key_is_ignored() {
    std::env::set_var(API_KEY_ENV_VAR, "   ");

    let result = resolve_api_key(&config_with_key(Some("toml-key"))).unwrap();
    assert_eq!(result, "toml-key");

    std::env::remove_var(API_KEY_ENV_VAR);
}

#[test]
#[serial]
fn test_missing_key_is_config_error() {
    std::env::remove_var(API_KEY_ENV_VAR);

    let result = resolve_api_key(&config_with_key(None));
    match result {
        Err(Error::Config(msg)) => assert!(msg.contains(API_KEY_ENV_VAR)),
        other => panic!("expected config error, got {:?}", other),
    }
}

#[test]
fn test_load_toml_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
        [catalog]
        base_url = "http://catalog.test"

        [resources]
        schema_path = "/opt/marc/MARC21slim.xsd"

        [output]
        directory = "/var/etd"
        summary_path = "/var/etd/summary.json"
        "#,
    )
    .unwrap();

    let config = load_toml_config(&path).unwrap();
    assert_eq!(config.catalog.base_url, "http://catalog.test");
    assert_eq!(config.catalog.project, "private");
    assert_eq!(
        config.resources.schema_path,
        PathBuf::from("/opt/marc/MARC21slim.xsd")
    );
    assert_eq!(
        config.output.summary_path,
        Some(PathBuf::from("/var/etd/summary.json"))
    );
}

#[test]
fn test_malformed_toml_is_config_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    std::fs::write(&path, "[pipeline\nconcurrency = ").unwrap();

    assert!(matches!(load_toml_config(&path), Err(Error::Config(_))));
}

#[test]
#[serial]
fn test_explicit_missing_file_is_error() {
    std::env::remove_var(CONFIG_ENV_VAR);
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("nope.toml");

    assert!(load_config(Some(&missing)).is_err());
}

#[test]
#[serial]
fn test_env_config_path_is_used() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("env.toml");
    std::fs::write(&path, "[pipeline]\nconcurrency = 7\n").unwrap();
    std::env::set_var(CONFIG_ENV_VAR, &path);

    let config = load_config(None).unwrap();
    assert_eq!(config.pipeline.concurrency, 7);

    std::env::remove_var(CONFIG_ENV_VAR);
}
