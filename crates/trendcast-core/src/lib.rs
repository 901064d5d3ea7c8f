//! Shared domain types and configuration for trendcast.

pub mod app_config;
pub mod config;
pub mod posts;

use thiserror::Error;

pub use app_config::{AppConfig, Environment, OverallDirectionPolicy};
pub use config::{build_app_config, load_app_config, load_app_config_from_env};
pub use posts::{PostRecord, TrendDirection};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
