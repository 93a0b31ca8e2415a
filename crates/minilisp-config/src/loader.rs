//! Config file loading.
//!
//! Implements the `Config::load()` algorithm:
//! 1. Parse `defaults.toml` → base
//! 2. Merge the config file, if one was given
//! 3. Apply environment overrides (`USE_CF_PROXY`, `MINILISP_*`)
//! 4. Deserialize merged tree → `Config`
//! 5. Validate

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, info};

use crate::env::apply_env_overrides;
use crate::error::{ConfigError, ConfigResult};
use crate::merge::deep_merge;
use crate::types::Config;
use crate::validate;

/// Embedded default configuration.
const DEFAULTS_TOML: &str = include_str!("defaults.toml");

/// Config files larger than this are rejected.
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

/// Load configuration from defaults, an optional file, and `env`.
///
/// Unlike discovery-based loading, an explicitly named file must exist.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file cannot be read or parsed, or if
/// the final configuration fails validation.
pub fn load(path: Option<&Path>, env: &HashMap<String, String>) -> ConfigResult<Config> {
    let mut merged: toml::Value =
        toml::from_str(DEFAULTS_TOML).map_err(|e| ConfigError::ParseError {
            path: "<embedded defaults>".to_owned(),
            source: e,
        })?;

    if let Some(path) = path {
        let overlay = load_file_value(path)?;
        deep_merge(&mut merged, &overlay);
        info!(path = %path.display(), "loaded config file");
    } else {
        debug!("no config file given, using defaults");
    }

    apply_env_overrides(&mut merged, env);

    let config: Config = merged.try_into().map_err(ConfigError::SchemaError)?;
    validate::validate(&config)?;
    Ok(config)
}

/// Load and validate a single file on top of the defaults, ignoring the
/// environment.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file cannot be read, parsed, or fails
/// validation.
pub fn load_file(path: &Path) -> ConfigResult<Config> {
    load(Some(path), &HashMap::new())
}

fn load_file_value(path: &Path) -> ConfigResult<toml::Value> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    // Check size after reading to avoid TOCTOU between stat and read.
    let size = u64::try_from(content.len()).unwrap_or(u64::MAX);
    if size > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::ValidationError {
            field: path.display().to_string(),
            message: format!(
                "config file is {size} bytes, exceeding the {MAX_CONFIG_FILE_SIZE} byte limit"
            ),
        });
    }

    toml::from_str(&content).map_err(|e| ConfigError::ParseError {
        path: path.display().to_string(),
        source: e,
    })
}
