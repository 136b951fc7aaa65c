use chrono::{DateTime, NaiveDate, Utc};

use crate::app_config::{AppConfig, PlacesConfig, WriteMode};
use crate::ConfigError;

/// Uid of the account every migrated review is attributed to.
pub const DEFAULT_LEGACY_USER_UID: &str = "6BGlA6AO35gWLwZ6TuAxiyzGQDp1";

const DEFAULT_USER_AGENT: &str = "revmig/0.1 (review-migration)";

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

/// Load only what a single place lookup needs.
///
/// Calls `dotenvy::dotenv().ok()` first, like [`load_app_config`].
///
/// # Errors
///
/// Returns `ConfigError` if `GOOGLE_MAPS_API_KEY` is missing or a transport
/// setting is invalid.
pub fn load_places_config() -> Result<PlacesConfig, ConfigError> {
    dotenvy::dotenv().ok();
    build_places_config(|key| std::env::var(key))
}

/// Build the Places-only configuration using the provided env-var lookup.
///
/// Airtable and Firebase variables are never read.
///
/// # Errors
///
/// Returns [`ConfigError::MissingEnvVar`] if `GOOGLE_MAPS_API_KEY` is absent or
/// blank and [`ConfigError::InvalidEnvVar`] for a transport setting that does
/// not parse.
pub fn build_places_config<F>(lookup: F) -> Result<PlacesConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let env = Env(lookup);
    Ok(PlacesConfig {
        google_maps_api_key: env.require("GOOGLE_MAPS_API_KEY")?,
        log_level: env.or_default("REVMIG_LOG_LEVEL", "info"),
        request_timeout_secs: env.parse_u64("REVMIG_REQUEST_TIMEOUT_SECS", "30")?,
        user_agent: env.or_default("REVMIG_USER_AGENT", DEFAULT_USER_AGENT),
        max_retries: env.parse_u32("REVMIG_MAX_RETRIES", "3")?,
        retry_backoff_base_ms: env.parse_u64("REVMIG_RETRY_BACKOFF_BASE_MS", "1000")?,
    })
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a plain
/// `HashMap` lookup.
///
/// # Errors
///
/// Returns [`ConfigError::MissingEnvVar`] for an absent or blank required
/// variable and [`ConfigError::InvalidEnvVar`] for one that does not parse.
pub fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let env = Env(lookup);

    let airtable_api_token = env.require("AIRTABLE_API_TOKEN")?;
    let airtable_base_id = env.require("AIRTABLE_BASE_ID")?;
    let airtable_table_name = env.require("AIRTABLE_TABLE_NAME")?;
    let google_maps_api_key = env.require("GOOGLE_MAPS_API_KEY")?;
    let firebase_project_id = env.require("FIREBASE_PROJECT_ID")?;
    let firebase_storage_bucket = env.require("FIREBASE_STORAGE_BUCKET")?;
    let firebase_service_account_email = env.require("FIREBASE_SERVICE_ACCOUNT_EMAIL")?;
    let google_access_token = env.require("GOOGLE_OAUTH_ACCESS_TOKEN")?;

    let firebase_collection_name = env.or_default("FIREBASE_COLLECTION_NAME", "places");
    let log_level = env.or_default("REVMIG_LOG_LEVEL", "info");
    let request_timeout_secs = env.parse_u64("REVMIG_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = env.or_default("REVMIG_USER_AGENT", DEFAULT_USER_AGENT);
    let max_retries = env.parse_u32("REVMIG_MAX_RETRIES", "3")?;
    let retry_backoff_base_ms = env.parse_u64("REVMIG_RETRY_BACKOFF_BASE_MS", "1000")?;

    let default_rating = parse_rating(&env.or_default("REVMIG_DEFAULT_RATING", "3"))
        .map_err(|reason| invalid("REVMIG_DEFAULT_RATING", &reason))?;

    let raw_mode = env.or_default("REVMIG_WRITE_MODE", "immediate");
    let write_mode = WriteMode::parse(&raw_mode).ok_or_else(|| {
        invalid(
            "REVMIG_WRITE_MODE",
            &format!("expected 'immediate' or 'batched', got '{raw_mode}'"),
        )
    })?;

    let photo_url_expires =
        parse_expiry_date(&env.or_default("REVMIG_PHOTO_URL_EXPIRES", "2025-03-17")).map_err(|reason| invalid("REVMIG_PHOTO_URL_EXPIRES", &reason))?;

    let legacy_user_uid = env.or_default("REVMIG_LEGACY_USER_UID", DEFAULT_LEGACY_USER_UID);
    let legacy_user_name = env.or_default("REVMIG_LEGACY_USER_NAME", "Legacy Review");

    Ok(AppConfig {
        log_level,
        airtable_api_token,
        airtable_base_id,
        airtable_table_name,
        google_maps_api_key,
        firebase_project_id,
        firebase_storage_bucket,
        firebase_collection_name,
        firebase_service_account_email,
        google_access_token,
        request_timeout_secs,
        user_agent,
        max_retries,
        retry_backoff_base_ms,
        default_rating,
        write_mode,
        photo_url_expires,
        legacy_user_uid,
        legacy_user_name,
    })
}

/// Env-var reader shared by the full and the Places-only configuration.
struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    /// Blank values count as missing.
    fn require(&self, var: &str) -> Result<String, ConfigError> {
        (self.0)(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    }

    fn or_default(&self, var: &str, default: &str) -> String {
        (self.0)(var).unwrap_or_else(|_| default.to_string())
    }

    fn parse_u32(&self, var: &str, default: &str) -> Result<u32, ConfigError> {
        self.or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, &e.to_string()))
    }

    fn parse_u64(&self, var: &str, default: &str) -> Result<u64, ConfigError> {
        self.or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, &e.to_string()))
    }
}

fn invalid(var: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason: reason.to_string(),
    }
}

/// Parses a default rating; must be a finite number between 0 and 5 inclusive.
///
/// # Errors
///
/// Returns a message if `raw` is not a number or is out of range.
pub fn parse_rating(raw: &str) -> Result<f64, String> {
    let value = raw.trim().parse::<f64>().map_err(|e| e.to_string())?;
    if !(0.0..=5.0).contains(&value) {
        return Err(format!("rating must be between 0 and 5, got {value}"));
    }
    Ok(value)
}

/// Parses a `YYYY-MM-DD` date into midnight UTC of that day.
fn parse_expiry_date(raw: &str) -> Result<DateTime<Utc>, String> {
    let date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|e| e.to_string())?;
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
        .ok_or_else(|| format!("invalid date '{raw}'"))
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
