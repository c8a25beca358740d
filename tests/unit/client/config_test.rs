// Client configuration: YAML files and environment overrides

use ksqlgen::ksql::config::{Protocol, ENV_HOST, ENV_PASSWORD, ENV_PORT, ENV_PROTOCOL, ENV_USERNAME};
use ksqlgen::{KsqlDbConfig, KsqlDbError};
use serial_test::serial;
use std::io::Write;
use tempfile::NamedTempFile;

fn clear_env() {
    for key in [ENV_HOST, ENV_PORT, ENV_PROTOCOL, ENV_USERNAME, ENV_PASSWORD] {
        std::env::remove_var(key);
    }
}

#[test]
fn test_load_yaml_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "host: ksqldb.internal\nport: 8443\nprotocol: https\nauth:\n  username: app\n  password: secret\n\
         default_stream_properties:\n  auto.offset.reset: latest\n  ksql.streams.num.stream.threads: \"4\"\n\
         max_retries: 5\nretry_delay_ms: 250"
    )
    .unwrap();

    let config = KsqlDbConfig::from_yaml_file(file.path()).unwrap();
    assert_eq!(config.base_url(), "https://ksqldb.internal:8443");
    assert_eq!(config.auth.as_ref().map(|auth| auth.username.as_str()), Some("app"));
    assert_eq!(
        config.default_stream_properties.get("auto.offset.reset").map(String::as_str),
        Some("latest")
    );
    assert_eq!(config.default_stream_properties.len(), 2);
    assert_eq!(config.max_retries, 5);
    assert_eq!(config.retry_delay_ms, 250);
    assert_eq!(config.timeout_seconds, 30);
}

#[test]
fn test_missing_file_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = KsqlDbConfig::from_yaml_file(dir.path().join("absent.yaml"));
    assert!(matches!(result, Err(KsqlDbError::Config { .. })));
}

#[test]
#[serial]
fn test_env_overrides() {
    clear_env();
    std::env::set_var(ENV_HOST, "ksql.prod");
    std::env::set_var(ENV_PORT, "9088");
    std::env::set_var(ENV_PROTOCOL, "HTTPS");
    std::env::set_var(ENV_USERNAME, "svc");
    std::env::set_var(ENV_PASSWORD, "pw");

    let mut config = KsqlDbConfig::default();
    config.apply_env_overrides().unwrap();
    clear_env();

    assert_eq!(config.base_url(), "https://ksql.prod:9088");
    assert_eq!(config.protocol, Protocol::Https);
    let auth = config.auth.unwrap();
    assert_eq!((auth.username.as_str(), auth.password.as_str()), ("svc", "pw"));
}

#[test]
#[serial]
fn test_env_password_keeps_configured_username() {
    clear_env();
    std::env::set_var(ENV_PASSWORD, "rotated");

    let mut config =
        KsqlDbConfig::from_yaml_str("auth:\n  username: app\n  password: old\n").unwrap();
    config.apply_env_overrides().unwrap();
    clear_env();

    let auth = config.auth.unwrap();
    assert_eq!(auth.username, "app");
    assert_eq!(auth.password, "rotated");
}

#[test]
#[serial]
fn test_invalid_env_port() {
    clear_env();
    std::env::set_var(ENV_PORT, "eighty");
    let mut config = KsqlDbConfig::default();
    let result = config.apply_env_overrides();
    clear_env();
    assert!(matches!(result, Err(KsqlDbError::Config { .. })));
}
