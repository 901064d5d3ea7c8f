use std::env::VarError;
use std::fmt::Display;
use std::str::FromStr;

use crate::app_config::{AppConfig, Environment, OverallDirectionPolicy};
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
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

fn parse_var<T, F>(lookup: &F, var: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Result<String, VarError>,
{
    let raw = lookup(var).unwrap_or_else(|_| default.to_string());
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
}

fn invalid(var: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason: reason.into(),
    }
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a
/// `HashMap` lookup.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvVar`] when a variable fails to parse or
/// validate.
pub fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let database_url = lookup("DATABASE_URL")
        .ok()
        .filter(|url| !url.trim().is_empty());
    let env = parse_environment(&or_default("TRENDCAST_ENV", "development"))?;
    let bind_addr = parse_var(&lookup, "TRENDCAST_BIND_ADDR", "0.0.0.0:8000")?;
    let log_level = or_default("TRENDCAST_LOG_LEVEL", "info");

    let fetch_limit: i64 = parse_var(&lookup, "TRENDCAST_FETCH_LIMIT", "50")?;
    if fetch_limit < 1 {
        return Err(invalid("TRENDCAST_FETCH_LIMIT", "must be at least 1"));
    }

    let up_threshold: f64 = parse_var(&lookup, "TRENDCAST_UP_THRESHOLD", "0.01")?;
    let down_threshold: f64 = parse_var(&lookup, "TRENDCAST_DOWN_THRESHOLD", "-0.01")?;
    if !up_threshold.is_finite() {
        return Err(invalid("TRENDCAST_UP_THRESHOLD", "must be finite"));
    }
    if !down_threshold.is_finite() || down_threshold > up_threshold {
        return Err(invalid(
            "TRENDCAST_DOWN_THRESHOLD",
            format!("must be finite and <= up threshold ({up_threshold})"),
        ));
    }

    let window_size: usize = parse_var(&lookup, "TRENDCAST_WINDOW_SIZE", "3")?;
    if window_size == 0 {
        return Err(invalid("TRENDCAST_WINDOW_SIZE", "must be at least 1"));
    }

    let overall_policy =
        parse_overall_policy(&or_default("TRENDCAST_OVERALL_POLICY", "first_last"))?;

    let forest_trees: usize = parse_var(&lookup, "TRENDCAST_FOREST_TREES", "50")?;
    if forest_trees == 0 {
        return Err(invalid("TRENDCAST_FOREST_TREES", "must be at least 1"));
    }
    let forest_seed: u64 = parse_var(&lookup, "TRENDCAST_FOREST_SEED", "42")?;
    let forest_max_depth = match lookup("TRENDCAST_FOREST_MAX_DEPTH") {
        Ok(raw) if !raw.trim().is_empty() => Some(
            raw.trim()
                .parse::<usize>()
                .map_err(|e| invalid("TRENDCAST_FOREST_MAX_DEPTH", e.to_string()))?,
        ),
        _ => None,
    };

    let imputer_fallback_score: f64 =
        parse_var(&lookup, "TRENDCAST_IMPUTER_FALLBACK_SCORE", "0.0")?;
    if !(0.0..=1.0).contains(&imputer_fallback_score) {
        return Err(invalid(
            "TRENDCAST_IMPUTER_FALLBACK_SCORE",
            "must be within [0, 1]",
        ));
    }

    let score_jitter: f64 = parse_var(&lookup, "TRENDCAST_SCORE_JITTER", "0.0")?;
    if !(0.0..1.0).contains(&score_jitter) {
        return Err(invalid("TRENDCAST_SCORE_JITTER", "must be within [0, 1)"));
    }

    let db_max_connections: u32 = parse_var(&lookup, "TRENDCAST_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections: u32 = parse_var(&lookup, "TRENDCAST_DB_MIN_CONNECTIONS", "1")?;
    if db_min_connections > db_max_connections {
        return Err(invalid(
            "TRENDCAST_DB_MIN_CONNECTIONS",
            format!("must be <= TRENDCAST_DB_MAX_CONNECTIONS ({db_max_connections})"),
        ));
    }
    let db_acquire_timeout_secs: u64 =
        parse_var(&lookup, "TRENDCAST_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        fetch_limit,
        up_threshold,
        down_threshold,
        window_size,
        overall_policy,
        forest_trees,
        forest_seed,
        forest_max_depth,
        imputer_fallback_score,
        score_jitter,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
    })
}

fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(invalid(
            "TRENDCAST_ENV",
            format!("unknown environment '{other}'"),
        )),
    }
}

fn parse_overall_policy(s: &str) -> Result<OverallDirectionPolicy, ConfigError> {
    match s {
        "first_last" => Ok(OverallDirectionPolicy::FirstToLast),
        "predicted_forecast" => Ok(OverallDirectionPolicy::PredictedToForecast),
        other => Err(invalid(
            "TRENDCAST_OVERALL_POLICY",
            format!("expected 'first_last' or 'predicted_forecast', got '{other}'"),
        )),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
