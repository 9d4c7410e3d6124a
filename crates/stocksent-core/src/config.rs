use chrono::NaiveDate;

use crate::app_config::{AppConfig, EmptyDayPolicy};
use crate::ConfigError;

/// Hugging Face inference endpoint for the `ProsusAI/finbert` model.
pub const DEFAULT_CLASSIFIER_URL: &str =
    "https://api-inference.huggingface.co/models/ProsusAI/finbert";

/// Upper bound the offset provider accepts for `per_page`.
pub const MAX_APITUBE_PAGE_SIZE: u32 = 500;

/// Longest accepted look-back window, roughly ten years.
pub const MAX_LOOKBACK_WEEKS: u32 = 520;

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

/// Build application configuration using the provided env-var lookup function.
///
/// Parsing and validation are decoupled from the real environment so they can
/// be tested with a plain `HashMap` lookup.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvVar`] naming the first variable whose value
/// cannot be parsed or is out of range.
pub fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
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

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let log_level = or_default("STOCKSENT_LOG_LEVEL", "info");
    let request_timeout_secs = parse_u64("STOCKSENT_REQUEST_TIMEOUT_SECS", "10")?;
    if request_timeout_secs == 0 {
        return Err(invalid(
            "STOCKSENT_REQUEST_TIMEOUT_SECS",
            "must be at least 1".to_string(),
        ));
    }
    let user_agent = or_default("STOCKSENT_USER_AGENT", "stocksent/0.1 (news-sentiment)");

    let lookback_weeks = parse_u32("STOCKSENT_LOOKBACK_WEEKS", "12")?;
    if lookback_weeks == 0 || lookback_weeks > MAX_LOOKBACK_WEEKS {
        return Err(invalid(
            "STOCKSENT_LOOKBACK_WEEKS",
            format!("must be between 1 and {MAX_LOOKBACK_WEEKS}"),
        ));
    }

    let apitube_page_size = parse_u32("STOCKSENT_APITUBE_PAGE_SIZE", "500")?;
    if apitube_page_size == 0 || apitube_page_size > MAX_APITUBE_PAGE_SIZE {
        return Err(invalid(
            "STOCKSENT_APITUBE_PAGE_SIZE",
            format!("must be between 1 and {MAX_APITUBE_PAGE_SIZE}"),
        ));
    }

    let apitube_start_date = {
        let raw = or_default("STOCKSENT_APITUBE_START_DATE", "2022-01-01");
        NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
            .map_err(|e| invalid("STOCKSENT_APITUBE_START_DATE", e.to_string()))?
    };

    let policy_raw = or_default("STOCKSENT_EMPTY_DAY_POLICY", "skip");
    let empty_day_policy = parse_empty_day_policy(&policy_raw).ok_or_else(|| {
        invalid(
            "STOCKSENT_EMPTY_DAY_POLICY",
            format!("expected `skip` or `stop`, got `{policy_raw}`"),
        )
    })?;

    let classifier_url = or_default("STOCKSENT_CLASSIFIER_URL", DEFAULT_CLASSIFIER_URL);
    let classifier_token = lookup("STOCKSENT_CLASSIFIER_TOKEN")
        .ok()
        .filter(|t| !t.trim().is_empty());
    let classifier_batch_size = parse_usize("STOCKSENT_CLASSIFIER_BATCH_SIZE", "32")?;
    if classifier_batch_size == 0 {
        return Err(invalid(
            "STOCKSENT_CLASSIFIER_BATCH_SIZE",
            "must be at least 1".to_string(),
        ));
    }

    Ok(AppConfig {
        log_level,
        request_timeout_secs,
        user_agent,
        lookback_weeks,
        apitube_page_size,
        apitube_start_date,
        empty_day_policy,
        classifier_url,
        classifier_token,
        classifier_batch_size,
    })
}

/// Parse an empty-day policy name. Matching is case-insensitive.
fn parse_empty_day_policy(s: &str) -> Option<EmptyDayPolicy> {
    match s.trim().to_ascii_lowercase().as_str() {
        "skip" => Some(EmptyDayPolicy::Skip),
        "stop" => Some(EmptyDayPolicy::Stop),
        _ => None,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
