//! Shared domain types and configuration loading for the buzz toolkit.

pub mod app_config;
pub mod config;
pub mod post;
pub mod score;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use post::{parse_timestamp, parse_timestamp_in, Post};
pub use score::{Factor, ScoreResult, MAX_SCORE, MIN_SCORE};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
