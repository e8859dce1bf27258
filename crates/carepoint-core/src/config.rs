use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if values are invalid.
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
/// Returns `ConfigError` if values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every upstream API key is optional at startup. A handler that needs a
/// missing key fails that request with a configuration error instead.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    // Blank values are treated as unset so `.env` templates can leave keys empty.
    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
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

    let env = parse_environment(&or_default("CAREPOINT_ENV", "development"))?;

    let bind_addr = or_default("CAREPOINT_BIND_ADDR", "0.0.0.0:3000")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("CAREPOINT_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("CAREPOINT_LOG_LEVEL", "info");

    let http_timeout_secs = parse_u64("CAREPOINT_HTTP_TIMEOUT_SECS", "15")?;
    if http_timeout_secs == 0 {
        return Err(invalid(
            "CAREPOINT_HTTP_TIMEOUT_SECS",
            "must be greater than zero".to_string(),
        ));
    }
    let user_agent = or_default("CAREPOINT_USER_AGENT", "carepoint/0.1 (service-finder)");

    let google_maps_api_key = optional("GOOGLE_MAPS_API_KEY");
    let sendgrid_api_key = optional("SENDGRID_API_KEY");
    let sendgrid_sender = or_default("SENDGRID_SENDER", "noreply@carepoint.local");
    let firestore_project_id = optional("FIRESTORE_PROJECT_ID");
    let firestore_api_key = optional("FIRESTORE_API_KEY");

    let profile_max_retries = parse_u32("CAREPOINT_PROFILE_MAX_RETRIES", "3")?;
    let profile_retry_backoff_ms = parse_u64("CAREPOINT_PROFILE_RETRY_BACKOFF_MS", "2000")?;

    let api_keys = or_default("CAREPOINT_API_KEYS", "")
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect();
    let rate_limit_per_minute = parse_usize("CAREPOINT_RATE_LIMIT_PER_MINUTE", "120")?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        http_timeout_secs,
        user_agent,
        google_maps_api_key,
        sendgrid_api_key,
        sendgrid_sender,
        firestore_project_id,
        firestore_api_key,
        profile_max_retries,
        profile_retry_backoff_ms,
        api_keys,
        rate_limit_per_minute,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for anything other than
/// `development`, `test` or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "CAREPOINT_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
