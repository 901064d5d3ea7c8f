use std::net::SocketAddr;

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

/// How the per-trend overall direction is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverallDirectionPolicy {
    /// Compare the first and last value (by timestamp) of one score column.
    #[default]
    FirstToLast,
    /// Compare the mean predicted score against the mean forecasted score.
    PredictedToForecast,
}

impl std::fmt::Display for OverallDirectionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OverallDirectionPolicy::FirstToLast => write!(f, "first_last"),
            OverallDirectionPolicy::PredictedToForecast => write!(f, "predicted_forecast"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: Option<String>,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub fetch_limit: i64,
    pub up_threshold: f64,
    pub down_threshold: f64,
    pub window_size: usize,
    pub overall_policy: OverallDirectionPolicy,
    pub forest_trees: usize,
    pub forest_seed: u64,
    pub forest_max_depth: Option<usize>,
    pub imputer_fallback_score: f64,
    pub score_jitter: f64,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
}

impl AppConfig {
    /// Return the database URL, or an error naming the missing variable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] when `DATABASE_URL` was not set.
    pub fn require_database_url(&self) -> Result<&str, ConfigError> {
        self.database_url
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[redacted]"),
            )
            .field("fetch_limit", &self.fetch_limit)
            .field("up_threshold", &self.up_threshold)
            .field("down_threshold", &self.down_threshold)
            .field("window_size", &self.window_size)
            .field("overall_policy", &self.overall_policy)
            .field("forest_trees", &self.forest_trees)
            .field("forest_seed", &self.forest_seed)
            .field("forest_max_depth", &self.forest_max_depth)
            .field("imputer_fallback_score", &self.imputer_fallback_score)
            .field("score_jitter", &self.score_jitter)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .finish()
    }
}
