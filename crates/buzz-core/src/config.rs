use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does not read `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable has a default so the toolkit works against a fresh checkout;
/// only malformed values fail.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let database_url = or_default("BUZZ_DATABASE_URL", "sqlite://data/buzz_database.db");
    if database_url.trim().is_empty() {
        return Err(invalid("BUZZ_DATABASE_URL", "must not be empty".to_string()));
    }

    let env = parse_environment(&or_default("BUZZ_ENV", "development"))?;
    let bind_addr = parse_addr("BUZZ_BIND_ADDR", "127.0.0.1:8501")?;
    let log_level = or_default("BUZZ_LOG_LEVEL", "info");
    let output_dir = PathBuf::from(or_default("BUZZ_OUTPUT_DIR", "./output"));

    let twitter_api_key = lookup("TWITTER_API_KEY")
        .ok()
        .filter(|key| !key.trim().is_empty());
    let api_base_url = or_default("BUZZ_API_BASE_URL", "https://api.twitterapi.io");
    let api_request_timeout_secs = parse_u64("BUZZ_API_REQUEST_TIMEOUT_SECS", "30")?;
    let api_inter_request_delay_ms = parse_u64("BUZZ_API_INTER_REQUEST_DELAY_MS", "3000")?;
    let api_max_retries = parse_u32("BUZZ_API_MAX_RETRIES", "2")?;
    let api_retry_backoff_base_secs = parse_u64("BUZZ_API_RETRY_BACKOFF_BASE_SECS", "2")?;

    let db_max_connections = parse_u32("BUZZ_DB_MAX_CONNECTIONS", "5")?;
    let db_min_connections = parse_u32("BUZZ_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("BUZZ_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let utc_offset_hours = parse_utc_offset(&or_default("BUZZ_UTC_OFFSET_HOURS", "9"))?;

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        output_dir,
        twitter_api_key,
        api_base_url,
        api_request_timeout_secs,
        api_inter_request_delay_ms,
        api_max_retries,
        api_retry_backoff_base_secs,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        utc_offset_hours,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "BUZZ_ENV".to_string(),
            reason: format!("expected development, test, or production; got '{other}'"),
        }),
    }
}

/// Parse the reporting UTC offset, restricted to real-world zone offsets.
fn parse_utc_offset(s: &str) -> Result<i32, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEnvVar {
        var: "BUZZ_UTC_OFFSET_HOURS".to_string(),
        reason,
    };
    let hours = s.trim().parse::<i32>().map_err(|e| invalid(e.to_string()))?;
    if (-12..=14).contains(&hours) {
        Ok(hours)
    } else {
        Err(invalid(format!("offset {hours} outside -12..=14")))
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
