use super::*;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_parse_duration() {
    assert_eq!(parse_duration("10s").unwrap(), Duration::from_secs(10));
    assert_eq!(parse_duration("5m").unwrap(), Duration::from_secs(300));
    assert_eq!(parse_duration("1h").unwrap(), Duration::from_secs(3600));
    assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
    assert_eq!(parse_duration("1d").unwrap(), Duration::from_secs(86400));
    assert_eq!(parse_duration("3").unwrap(), Duration::from_secs(3));
}

#[test]
fn test_parse_duration_rejects_garbage() {
    assert!(parse_duration("").is_err());
    assert!(parse_duration("ms").is_err());
    assert!(parse_duration("10y").is_err());
    assert!(parse_duration("18446744073709551615d").is_err());
}

#[test]
fn test_format_duration() {
    assert_eq!(format_duration(&Duration::ZERO), "0s");
    assert_eq!(format_duration(&Duration::from_millis(1500)), "1500ms");
    assert_eq!(format_duration(&Duration::from_secs(120)), "2m");
    assert_eq!(format_duration(&Duration::from_secs(7200)), "2h");
}

#[test]
fn test_directive_sets_banfile() {
    let config = BanlistConfig::from_directive("fail2ban /tmp/banned-ips").unwrap();
    assert_eq!(config.banfile, PathBuf::from("/tmp/banned-ips"));
    assert_eq!(config.reload_failure, ReloadFailurePolicy::KeepLastGood);
    assert_eq!(config.ban_header.as_deref(), Some(DEFAULT_BAN_HEADER));
}

#[test]
fn test_directive_missing_path() {
    let err = BanlistConfig::from_directive("fail2ban").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Configuration error: fail2ban expects file path, value is missing"
    );
}

#[test]
fn test_directive_unknown_value() {
    let err = BanlistConfig::from_directive("fail2ban /tmp/x banfile").unwrap_err();
    assert_eq!(err.to_string(), "Configuration error: unknown config value: banfile");
}

#[test]
fn test_directive_empty() {
    assert!(BanlistConfig::from_directive("   ").is_err());
}

#[test]
fn test_yaml_defaults() {
    let config =
        BanlistConfig::parse_yaml("banfile: /var/lib/banned\n", Path::new("test.yaml")).unwrap();
    assert_eq!(config, BanlistConfig::new("/var/lib/banned"));
    assert_eq!(config.command_buffer, DEFAULT_COMMAND_BUFFER);
    assert!(config.query_timeout.is_none());
}

#[test]
fn test_yaml_full() {
    let yaml = r#"
banfile: banned
query_timeout: 500ms
reload_failure: terminate
command_buffer: 16
ban_header: null
"#;
    let config = BanlistConfig::parse_yaml(yaml, Path::new("test.yaml")).unwrap();
    assert_eq!(config.query_timeout, Some(Duration::from_millis(500)));
    assert_eq!(config.reload_failure, ReloadFailurePolicy::Terminate);
    assert_eq!(config.command_buffer, 16);
    assert!(config.ban_header.is_none());
}

#[test]
fn test_yaml_error_names_field() {
    let yaml = "banfile: banned\nquery_timeout: soon\n";
    let err = BanlistConfig::parse_yaml(yaml, Path::new("test.yaml")).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("query_timeout"), "unexpected message: {}", msg);
}

#[test]
fn test_yaml_rejects_unknown_fields() {
    let yaml = "banfile: banned\nbanfiles: other\n";
    assert!(BanlistConfig::parse_yaml(yaml, Path::new("test.yaml")).is_err());
}

#[test]
fn test_validate_rejects_zero_buffer() {
    let mut config = BanlistConfig::new("banned");
    config.command_buffer = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_rejects_zero_timeout() {
    let config = BanlistConfig::new("banned").with_query_timeout(Duration::ZERO);
    assert!(config.validate().is_err());
}

#[test]
fn test_load_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("missing.yaml");
    assert!(matches!(
        BanlistConfig::load(&path),
        Err(BanlistError::ConfigNotFound(p)) if p == path
    ));
}

#[test]
fn test_load_round_trip_through_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("banlist.yaml");
    let config = BanlistConfig::new(temp_dir.path().join("banned"))
        .with_query_timeout(Duration::from_secs(2))
        .with_reload_failure(ReloadFailurePolicy::Terminate);
    std::fs::write(&path, serde_yaml::to_string(&config).unwrap()).unwrap();

    assert_eq!(BanlistConfig::load(&path).unwrap(), config);
}
