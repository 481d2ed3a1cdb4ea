use std::path::PathBuf;
use std::str::FromStr;

use crate::app_config::{AnalysisConfig, AppConfig, BiasWeights, Environment};
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

fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let env = parse_environment(&or_default("SLANT_ENV", "development"))?;
    let database_url = or_default("SLANT_DATABASE_URL", "sqlite://slant.db?mode=rwc");
    let log_level = or_default("SLANT_LOG_LEVEL", "info");
    let articles_dir = PathBuf::from(or_default("SLANT_ARTICLES_DIR", "./data/articles"));
    let patterns_path = lookup("SLANT_PATTERNS_PATH")
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from);

    let db_max_connections: u32 = parse_var(&or_default, "SLANT_DB_MAX_CONNECTIONS", "5")?;
    let db_acquire_timeout_secs: u64 =
        parse_var(&or_default, "SLANT_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let analysis = AnalysisConfig {
        positive_threshold: parse_var(&or_default, "SLANT_SENTIMENT_POSITIVE_THRESHOLD", "0.1")?,
        negative_threshold: parse_var(&or_default, "SLANT_SENTIMENT_NEGATIVE_THRESHOLD", "-0.1")?,
        content_max_chars: parse_var(&or_default, "SLANT_CONTENT_MAX_CHARS", "50000")?,
        content_min_chars: parse_var(&or_default, "SLANT_CONTENT_MIN_CHARS", "10")?,
        batch_size: parse_var(&or_default, "SLANT_INGEST_BATCH_SIZE", "10")?,
        max_entities_per_article: parse_var(&or_default, "SLANT_MAX_ENTITIES_PER_ARTICLE", "20")?,
        min_entity_chars: parse_var(&or_default, "SLANT_MIN_ENTITY_CHARS", "4")?,
        sample_results: parse_var(&or_default, "SLANT_SAMPLE_RESULTS", "20")?,
        bias_weights: BiasWeights {
            skew: parse_var(&or_default, "SLANT_BIAS_SKEW_WEIGHT", "0.6")?,
            concentration: parse_var(&or_default, "SLANT_BIAS_CONCENTRATION_WEIGHT", "0.4")?,
        },
        detect_changes: parse_var(&or_default, "SLANT_DETECT_CHANGES", "false")?,
    };

    validate_analysis(&analysis)?;

    Ok(AppConfig {
        database_url,
        env,
        log_level,
        articles_dir,
        patterns_path,
        db_max_connections,
        db_acquire_timeout_secs,
        analysis,
    })
}

fn parse_var<T, D>(or_default: &D, var: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    D: Fn(&str, &str) -> String,
{
    let raw = or_default(var, default);
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
}

fn validate_analysis(analysis: &AnalysisConfig) -> Result<(), ConfigError> {
    let invalid = |var: &str, reason: &str| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason: reason.to_string(),
    };

    if !analysis.positive_threshold.is_finite() {
        return Err(invalid("SLANT_SENTIMENT_POSITIVE_THRESHOLD", "must be finite"));
    }
    if !analysis.negative_threshold.is_finite() {
        return Err(invalid("SLANT_SENTIMENT_NEGATIVE_THRESHOLD", "must be finite"));
    }
    if analysis.negative_threshold > analysis.positive_threshold {
        return Err(invalid(
            "SLANT_SENTIMENT_NEGATIVE_THRESHOLD",
            "must not exceed the positive threshold",
        ));
    }
    if analysis.batch_size == 0 {
        return Err(invalid("SLANT_INGEST_BATCH_SIZE", "must be greater than 0"));
    }
    if analysis.content_max_chars == 0 {
        return Err(invalid("SLANT_CONTENT_MAX_CHARS", "must be greater than 0"));
    }
    if analysis.max_entities_per_article == 0 {
        return Err(invalid(
            "SLANT_MAX_ENTITIES_PER_ARTICLE",
            "must be greater than 0",
        ));
    }
    let weights = analysis.bias_weights;
    if !(weights.skew.is_finite() && weights.skew >= 0.0) {
        return Err(invalid("SLANT_BIAS_SKEW_WEIGHT", "must be a non-negative number"));
    }
    if !(weights.concentration.is_finite() && weights.concentration >= 0.0) {
        return Err(invalid(
            "SLANT_BIAS_CONCENTRATION_WEIGHT",
            "must be a non-negative number",
        ));
    }
    Ok(())
}

fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "SLANT_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
