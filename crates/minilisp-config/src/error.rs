//! Configuration error types.

use thiserror::Error;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A config file could not be read.
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        /// Path of the file.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A config file (or the embedded defaults) is not valid TOML.
    #[error("failed to parse {path}: {source}")]
    ParseError {
        /// Path of the file, or `<embedded defaults>`.
        path: String,
        /// Underlying TOML error.
        source: toml::de::Error,
    },

    /// The merged tree does not match the config schema.
    #[error("invalid configuration: {0}")]
    SchemaError(#[source] toml::de::Error),

    /// A field holds a value outside its accepted range.
    #[error("invalid value for {field}: {message}")]
    ValidationError {
        /// Dotted field path (e.g. `source.url`).
        field: String,
        /// What is wrong with it.
        message: String,
    },
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
