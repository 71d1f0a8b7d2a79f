use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
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
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>().map_err(|e| invalid(var, e.to_string()))
    };

    let non_zero_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let value = parse_usize(var, default)?;
        if value == 0 {
            return Err(invalid(var, "must be greater than zero".to_string()));
        }
        Ok(value)
    };

    let database_url = require("DATABASE_URL")?;
    let news_api_keys = parse_api_keys(&require("NEWS_API_KEYS")?);
    if news_api_keys.is_empty() {
        return Err(invalid(
            "NEWS_API_KEYS",
            "no non-blank keys in comma-separated list".to_string(),
        ));
    }
    let scorer_url = require("SENTIFLOW_SCORER_URL")?;

    let env = parse_environment(&or_default("SENTIFLOW_ENV", "development"))?;
    let log_level = or_default("SENTIFLOW_LOG_LEVEL", "info");
    let entities_path = PathBuf::from(or_default(
        "SENTIFLOW_ENTITIES_PATH",
        "./config/entities.yaml",
    ));

    let db_max_connections = parse_u32("SENTIFLOW_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("SENTIFLOW_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("SENTIFLOW_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let news_api_base_url = or_default("NEWS_API_BASE_URL", "https://newsapi.org");
    let news_language = or_default("NEWS_API_LANGUAGE", "en");
    let news_page_size = parse_u32("NEWS_API_PAGE_SIZE", "100")?;
    if news_page_size == 0 || news_page_size > 100 {
        return Err(invalid(
            "NEWS_API_PAGE_SIZE",
            "must be between 1 and 100".to_string(),
        ));
    }
    let news_max_pages = parse_u32("NEWS_API_MAX_PAGES", "5")?;
    let news_request_timeout_secs = parse_u64("NEWS_API_REQUEST_TIMEOUT_SECS", "15")?;
    let news_inter_page_delay_ms = parse_u64("NEWS_API_INTER_PAGE_DELAY_MS", "1200")?;
    let news_max_concurrent_queries = non_zero_usize("NEWS_API_MAX_CONCURRENT_QUERIES", "5")?;
    let news_max_retries = parse_u32("NEWS_API_MAX_RETRIES", "3")?;
    let news_retry_backoff_base_ms = parse_u64("NEWS_API_RETRY_BACKOFF_BASE_MS", "1000")?;

    let scorer_batch_size = non_zero_usize("SENTIFLOW_SCORER_BATCH_SIZE", "32")?;
    let scorer_max_concurrent_batches =
        non_zero_usize("SENTIFLOW_SCORER_MAX_CONCURRENT_BATCHES", "1")?;
    let scorer_entailment_label = or_default("SENTIFLOW_SCORER_ENTAILMENT_LABEL", "entailment");
    let scorer_timeout_secs = parse_u64("SENTIFLOW_SCORER_TIMEOUT_SECS", "120")?;

    Ok(AppConfig {
        database_url,
        env,
        log_level,
        entities_path,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        news_api_keys,
        news_api_base_url,
        news_language,
        news_page_size,
        news_max_pages,
        news_request_timeout_secs,
        news_inter_page_delay_ms,
        news_max_concurrent_queries,
        news_max_retries,
        news_retry_backoff_base_ms,
        scorer_url,
        scorer_batch_size,
        scorer_max_concurrent_batches,
        scorer_entailment_label,
        scorer_timeout_secs,
    })
}

/// Split a comma-separated key list, dropping blanks.
fn parse_api_keys(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "SENTIFLOW_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
