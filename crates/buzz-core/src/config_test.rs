use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

fn empty_env<'a>() -> HashMap<&'a str, &'a str> {
    HashMap::new()
}

#[test]
fn parse_environment_development() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
}

#[test]
fn parse_environment_test() {
    assert_eq!(parse_environment("test").unwrap(), Environment::Test);
}

#[test]
fn parse_environment_production() {
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("staging").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "BUZZ_ENV"));
}

#[test]
fn build_app_config_uses_defaults_for_empty_env() {
    let map = empty_env();
    let result = build_app_config(lookup_from_map(&map));
    assert!(result.is_ok(), "expected Ok, got: {result:?}");
    let cfg = result.unwrap();
    assert_eq!(cfg.database_url, "sqlite://data/buzz_database.db");
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.bind_addr.to_string(), "127.0.0.1:8501");
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.output_dir, std::path::PathBuf::from("./output"));
    assert!(cfg.twitter_api_key.is_none());
    assert_eq!(cfg.api_base_url, "https://api.twitterapi.io");
    assert_eq!(cfg.api_request_timeout_secs, 30);
    assert_eq!(cfg.api_inter_request_delay_ms, 3000);
    assert_eq!(cfg.api_max_retries, 2);
    assert_eq!(cfg.api_retry_backoff_base_secs, 2);
    assert_eq!(cfg.db_max_connections, 5);
    assert_eq!(cfg.db_min_connections, 1);
    assert_eq!(cfg.db_acquire_timeout_secs, 10);
    assert_eq!(cfg.utc_offset_hours, 9);
}

#[test]
fn build_app_config_fails_with_empty_database_url() {
    let mut map = empty_env();
    map.insert("BUZZ_DATABASE_URL", "  ");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "BUZZ_DATABASE_URL"),
        "expected InvalidEnvVar(BUZZ_DATABASE_URL), got: {result:?}"
    );
}

#[test]
fn build_app_config_fails_with_invalid_bind_addr() {
    let mut map = empty_env();
    map.insert("BUZZ_BIND_ADDR", "not-a-socket-addr");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "BUZZ_BIND_ADDR"),
        "expected InvalidEnvVar(BUZZ_BIND_ADDR), got: {result:?}"
    );
}

#[test]
fn build_app_config_reads_api_key() {
    let mut map = empty_env();
    map.insert("TWITTER_API_KEY", "secret-key");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.require_api_key().unwrap(), "secret-key");
}

#[test]
fn blank_api_key_is_treated_as_missing() {
    let mut map = empty_env();
    map.insert("TWITTER_API_KEY", "   ");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.twitter_api_key.is_none());
    assert!(matches!(
        cfg.require_api_key(),
        Err(ConfigError::MissingEnvVar(ref v)) if v == "TWITTER_API_KEY"
    ));
}

#[test]
fn debug_output_redacts_api_key() {
    let mut map = empty_env();
    map.insert("TWITTER_API_KEY", "super-secret");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("super-secret"));
    assert!(rendered.contains("[redacted]"));
}

#[test]
fn api_request_timeout_secs_override() {
    let mut map = empty_env();
    map.insert("BUZZ_API_REQUEST_TIMEOUT_SECS", "60");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.api_request_timeout_secs, 60);
}

#[test]
fn api_request_timeout_secs_invalid() {
    let mut map = empty_env();
    map.insert("BUZZ_API_REQUEST_TIMEOUT_SECS", "not-a-number");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "BUZZ_API_REQUEST_TIMEOUT_SECS"),
        "expected InvalidEnvVar(BUZZ_API_REQUEST_TIMEOUT_SECS), got: {result:?}"
    );
}

#[test]
fn api_inter_request_delay_ms_override() {
    let mut map = empty_env();
    map.insert("BUZZ_API_INTER_REQUEST_DELAY_MS", "500");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.api_inter_request_delay_ms, 500);
}

#[test]
fn api_max_retries_invalid() {
    let mut map = empty_env();
    map.insert("BUZZ_API_MAX_RETRIES", "-1");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "BUZZ_API_MAX_RETRIES"),
        "expected InvalidEnvVar(BUZZ_API_MAX_RETRIES), got: {result:?}"
    );
}

#[test]
fn utc_offset_accepts_negative_hours() {
    let mut map = empty_env();
    map.insert("BUZZ_UTC_OFFSET_HOURS", "-5");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.utc_offset_hours, -5);
    assert_eq!(cfg.utc_offset().local_minus_utc(), -5 * 3600);
}

#[test]
fn utc_offset_out_of_range_fails() {
    let mut map = empty_env();
    map.insert("BUZZ_UTC_OFFSET_HOURS", "15");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "BUZZ_UTC_OFFSET_HOURS"),
        "expected InvalidEnvVar(BUZZ_UTC_OFFSET_HOURS), got: {result:?}"
    );
}

#[test]
fn environment_display_round_trips_names() {
    assert_eq!(Environment::Production.to_string(), "production");
    assert_eq!(Environment::Test.to_string(), "test");
}
