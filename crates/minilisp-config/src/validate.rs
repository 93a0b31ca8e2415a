//! Post-merge configuration validation.

use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: &[&str] = &["pretty", "compact", "json", "full"];

/// Validate a fully merged and deserialized configuration.
///
/// # Errors
///
/// Returns the first validation error found.
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_http_url("source.url", &config.source.url)?;
    validate_http_url("source.proxy_endpoint", &config.source.proxy_endpoint)?;
    validate_install(config)?;
    validate_http(config)?;
    validate_logging(config)?;
    Ok(())
}

/// Check that `raw` parses as an absolute `http` or `https` URL.
///
/// # Errors
///
/// Returns [`ConfigError::ValidationError`] naming `field` otherwise.
pub fn validate_http_url(field: &str, raw: &str) -> ConfigResult<()> {
    let parsed = url::Url::parse(raw).map_err(|e| ConfigError::ValidationError {
        field: field.to_owned(),
        message: format!("'{raw}' is not an absolute URL: {e}"),
    })?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::ValidationError {
            field: field.to_owned(),
            message: format!("unsupported scheme '{}'; expected http or https", parsed.scheme()),
        });
    }

    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(ConfigError::ValidationError {
            field: field.to_owned(),
            message: format!("'{raw}' has no host"),
        });
    }

    Ok(())
}

fn validate_install(config: &Config) -> ConfigResult<()> {
    if config.install.destination.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "install.destination".to_owned(),
            message: "destination must not be empty".to_owned(),
        });
    }
    Ok(())
}

fn validate_http(config: &Config) -> ConfigResult<()> {
    let h = &config.http;

    let positive = [
        ("http.timeout_secs", h.timeout_secs),
        ("http.connect_timeout_secs", h.connect_timeout_secs),
        ("http.max_download_size", h.max_download_size),
        ("http.max_entry_size", h.max_entry_size),
    ];
    for (field, value) in positive {
        if value == 0 {
            return Err(ConfigError::ValidationError {
                field: field.to_owned(),
                message: "must be greater than zero".to_owned(),
            });
        }
    }

    if h.user_agent.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "http.user_agent".to_owned(),
            message: "user agent must not be empty".to_owned(),
        });
    }

    Ok(())
}

fn validate_logging(config: &Config) -> ConfigResult<()> {
    let l = &config.logging;

    if !LOG_LEVELS.contains(&l.level.as_str()) {
        return Err(ConfigError::ValidationError {
            field: "logging.level".to_owned(),
            message: format!(
                "unknown level '{}'; expected one of: {}",
                l.level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if !LOG_FORMATS.contains(&l.format.as_str()) {
        return Err(ConfigError::ValidationError {
            field: "logging.format".to_owned(),
            message: format!(
                "unknown format '{}'; expected one of: {}",
                l.format,
                LOG_FORMATS.join(", ")
            ),
        });
    }

    Ok(())
}
