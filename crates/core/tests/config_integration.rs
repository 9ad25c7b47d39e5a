//! 설정 로딩 통합 테스트 -- 실제 파일과 환경변수를 사용한 검증

use std::fs;

use logfwd_core::config::LogfwdConfig;
use logfwd_core::error::{ConfigError, LogfwdError};
use serial_test::serial;
use tempfile::TempDir;

const FULL_CONFIG: &str = r#"
[general]
log_level = "debug"
log_format = "pretty"

[serializer]
schema = "access.conf"
config_dir = "/opt/logfwd/schemas"
on_mismatch = "fail"
strict_coercion = true

[transport]
topic = "access:2"
key = "web-01"
output = "/var/spool/logfwd/frames.bin"
"#;

#[tokio::test]
#[serial]
async fn load_full_config_from_file() {
    let dir = TempDir::new().expect("should create temp dir");
    let path = dir.path().join("logfwd.toml");
    fs::write(&path, FULL_CONFIG).expect("should write config");

    let config = LogfwdConfig::load(&path).await.expect("config should load");

    assert_eq!(config.general.log_level, "debug");
    assert_eq!(config.general.log_format, "pretty");
    assert_eq!(config.serializer.schema, "access.conf");
    assert_eq!(config.serializer.config_dir, "/opt/logfwd/schemas");
    assert_eq!(config.serializer.on_mismatch, "fail");
    assert!(config.serializer.strict_coercion);
    assert_eq!(config.transport.topic, "access:2");
    assert_eq!(config.transport.key, "web-01");
}

#[tokio::test]
#[serial]
async fn env_override_wins_over_file() {
    let dir = TempDir::new().expect("should create temp dir");
    let path = dir.path().join("logfwd.toml");
    fs::write(&path, FULL_CONFIG).expect("should write config");

    // SAFETY: serial 테스트로 실행되어 환경변수 조작이 다른 테스트와 겹치지 않습니다.
    unsafe { std::env::set_var("LOGFWD_TRANSPORT_KEY", "override-key") };
    let result = LogfwdConfig::load(&path).await;
    unsafe { std::env::remove_var("LOGFWD_TRANSPORT_KEY") };

    let config = result.expect("config should load");
    assert_eq!(config.transport.key, "override-key");
}

#[tokio::test]
#[serial]
async fn invalid_env_override_fails_validation() {
    let dir = TempDir::new().expect("should create temp dir");
    let path = dir.path().join("logfwd.toml");
    fs::write(&path, FULL_CONFIG).expect("should write config");

    // SAFETY: serial 테스트로 실행되어 환경변수 조작이 다른 테스트와 겹치지 않습니다.
    unsafe { std::env::set_var("LOGFWD_SERIALIZER_ON_MISMATCH", "explode") };
    let result = LogfwdConfig::load(&path).await;
    unsafe { std::env::remove_var("LOGFWD_SERIALIZER_ON_MISMATCH") };

    let err = result.expect_err("invalid policy should be rejected");
    assert!(matches!(
        err,
        LogfwdError::Config(ConfigError::InvalidValue { .. })
    ));
}

#[tokio::test]
async fn malformed_toml_fails_to_load() {
    let dir = TempDir::new().expect("should create temp dir");
    let path = dir.path().join("bad.toml");
    fs::write(&path, "[serializer\nschema = \"x\"\n").expect("should write config");

    let err = LogfwdConfig::load(&path).await.expect_err("should fail");
    assert!(matches!(
        err,
        LogfwdError::Config(ConfigError::ParseFailed { .. })
    ));
}

#[tokio::test]
async fn invalid_log_format_in_file_is_rejected() {
    let dir = TempDir::new().expect("should create temp dir");
    let path = dir.path().join("logfwd.toml");
    fs::write(&path, "[general]\nlog_format = \"xml\"\n").expect("should write config");

    let err = LogfwdConfig::from_file(&path).await.expect_err("should fail");
    assert!(err.to_string().contains("log_format"));
}
