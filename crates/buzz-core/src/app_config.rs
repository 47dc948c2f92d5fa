use std::net::SocketAddr;
use std::path::PathBuf;

use chrono::{FixedOffset, Offset, Utc};

use crate::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub output_dir: PathBuf,
    pub twitter_api_key: Option<String>,
    pub api_base_url: String,
    pub api_request_timeout_secs: u64,
    pub api_inter_request_delay_ms: u64,
    pub api_max_retries: u32,
    pub api_retry_backoff_base_secs: u64,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    /// Offset applied to post timestamps before bucketing by hour/weekday.
    pub utc_offset_hours: i32,
}

impl AppConfig {
    /// Returns the scraping API key, which only the `fetch` flows need.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] when `TWITTER_API_KEY` was not set.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.twitter_api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("TWITTER_API_KEY".to_string()))
    }

    /// The configured reporting offset. Falls back to UTC if the hour count
    /// is outside what [`FixedOffset`] accepts.
    #[must_use]
    pub fn utc_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_hours * 3600).unwrap_or_else(|| Utc.fix())
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("database_url", &self.database_url)
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("output_dir", &self.output_dir)
            .field(
                "twitter_api_key",
                &self.twitter_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("api_base_url", &self.api_base_url)
            .field("api_request_timeout_secs", &self.api_request_timeout_secs)
            .field(
                "api_inter_request_delay_ms",
                &self.api_inter_request_delay_ms,
            )
            .field("api_max_retries", &self.api_max_retries)
            .field(
                "api_retry_backoff_base_secs",
                &self.api_retry_backoff_base_secs,
            )
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("utc_offset_hours", &self.utc_offset_hours)
            .finish()
    }
}
