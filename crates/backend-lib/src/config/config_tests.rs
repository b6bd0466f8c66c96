use super::*;
use std::io::Write;
use tempfile::tempdir;

#[test]
fn test_default_settings_are_valid() {
    let settings = Settings::default();
    assert!(settings.validate().is_ok());
    assert_eq!(settings.auth.min_password_length, 5);
    assert_eq!(settings.auth.session_ttl(), None);
    assert_eq!(settings.bootstrap.env_prefix, "USER_");
    assert!(settings.bootstrap.fallback_account);
}

#[test]
fn test_settings_validation() {
    let settings = Settings::default();

    let mut invalid = settings.clone();
    invalid.log_level = "loud".to_string();
    assert!(invalid.validate().is_err());

    let mut invalid = settings.clone();
    invalid.auth.min_password_length = 4;
    assert!(invalid.validate().is_err());

    let mut invalid = settings.clone();
    invalid.auth.session_ttl_secs = Some(0);
    assert!(invalid.validate().is_err());

    let mut invalid = settings.clone();
    invalid.auth.sweep_interval_secs = 0;
    assert!(invalid.validate().is_err());

    let mut invalid = settings.clone();
    invalid.bootstrap.env_prefix.clear();
    assert!(invalid.validate().is_err());

    let mut invalid = settings.clone();
    invalid.hashing.r = 0;
    assert!(invalid.validate().is_err());

    let mut invalid = settings.clone();
    invalid.hashing.max_concurrent = 0;
    assert!(invalid.validate().is_err());

    let mut valid = settings;
    valid.log_level = "DEBUG".to_string();
    valid.auth.min_password_length = 12;
    assert!(valid.validate().is_ok());
}

#[test]
fn test_load_settings_from_file() {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("beeauth.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(
        file,
        r#"
bind_addr = "127.0.0.1:8080"
server_name = "hive-1"
log_format = "json"

[auth]
session_ttl_secs = 900

[hashing]
log_n = 10

[bootstrap]
fallback_account = false
"#
    )
    .unwrap();

    let settings = Settings::load_from(&path).unwrap();
    assert_eq!(settings.bind_addr.to_string(), "127.0.0.1:8080");
    assert_eq!(settings.server_name, "hive-1");
    assert_eq!(settings.log_format, LogFormat::Json);
    assert_eq!(settings.auth.session_ttl(), Some(Duration::from_secs(900)));
    // untouched keys keep their defaults
    assert_eq!(settings.auth.min_password_length, 5);
    assert_eq!(settings.hashing.log_n, 10);
    assert_eq!(settings.hashing.r, 8);
    assert!(!settings.bootstrap.fallback_account);
    assert_eq!(settings.bootstrap.env_prefix, "USER_");
}

#[test]
fn test_load_rejects_invalid_file() {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("beeauth.toml");
    std::fs::write(&path, "[auth]\nmin_password_length = 3\n").unwrap();

    assert!(Settings::load_from(&path).is_err());
}

#[test]
fn test_load_missing_file_is_an_error() {
    let temp_dir = tempdir().unwrap();
    assert!(Settings::load_from(temp_dir.path().join("nope.toml")).is_err());
}
