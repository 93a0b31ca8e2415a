//! Subscriber setup.

use std::str::FromStr;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

use crate::error::{TelemetryError, TelemetryResult};

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-line, human-friendly output.
    Pretty,
    /// One line per event.
    #[default]
    Compact,
    /// Newline-delimited JSON.
    Json,
    /// The `tracing_subscriber` default formatter.
    Full,
}

impl FromStr for LogFormat {
    type Err = TelemetryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            "full" => Ok(Self::Full),
            other => Err(TelemetryError::ConfigError(format!(
                "unknown log format '{other}'"
            ))),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Base level filter (e.g. `"info"`).
    pub level: String,
    /// Output format.
    pub format: LogFormat,
    /// Extra `EnvFilter` directives (e.g. `"reqwest=warn"`).
    pub directives: Vec<String>,
    /// Include the event target (module path) in each line.
    pub with_target: bool,
}

impl LogConfig {
    /// Create a config with the given base level and compact output.
    #[must_use]
    pub fn new(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            format: LogFormat::Compact,
            directives: Vec::new(),
            with_target: false,
        }
    }

    /// Set the output format.
    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Add a filter directive.
    #[must_use]
    pub fn with_directive(mut self, directive: impl Into<String>) -> Self {
        self.directives.push(directive.into());
        self
    }

    /// Toggle event targets.
    #[must_use]
    pub fn with_target(mut self, enabled: bool) -> Self {
        self.with_target = enabled;
        self
    }

    /// Build the `EnvFilter` for this config.
    ///
    /// # Errors
    ///
    /// Returns [`TelemetryError::ConfigError`] if the level or a directive
    /// does not parse.
    pub fn env_filter(&self) -> TelemetryResult<EnvFilter> {
        let mut filter = EnvFilter::try_new(&self.level).map_err(|e| {
            TelemetryError::ConfigError(format!("invalid log level '{}': {e}", self.level))
        })?;

        for directive in &self.directives {
            let parsed = directive.parse::<Directive>().map_err(|e| {
                TelemetryError::ConfigError(format!("invalid directive '{directive}': {e}"))
            })?;
            filter = filter.add_directive(parsed);
        }

        Ok(filter)
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::new("info")
    }
}

/// Install the global subscriber. Output goes to stderr so stdout stays
/// free for command output.
///
/// # Errors
///
/// Returns [`TelemetryError::ConfigError`] for a bad filter and
/// [`TelemetryError::InitError`] if a global subscriber is already set.
pub fn setup_logging(config: &LogConfig) -> TelemetryResult<()> {
    let filter = config.env_filter()?;
    let registry = tracing_subscriber::registry().with(filter);

    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(config.with_target);

    let result = match config.format {
        LogFormat::Pretty => registry.with(layer.pretty()).try_init(),
        LogFormat::Compact => registry.with(layer.compact()).try_init(),
        LogFormat::Json => registry.with(layer.json()).try_init(),
        LogFormat::Full => registry.with(layer).try_init(),
    };

    result.map_err(|e| TelemetryError::InitError(e.to_string()))
}

/// Install an info-level compact subscriber.
///
/// # Errors
///
/// See [`setup_logging`].
pub fn setup_default_logging() -> TelemetryResult<()> {
    setup_logging(&LogConfig::default())
}

/// Build a [`LogConfig`] from the `[logging]` section.
#[cfg(feature = "config")]
#[must_use]
pub fn from_config(cfg: &minilisp_config::Config) -> LogConfig {
    let format = cfg.logging.format.parse().unwrap_or_default();

    let mut log_config = LogConfig::new(&cfg.logging.level).with_format(format);
    for directive in &cfg.logging.directives {
        log_config = log_config.with_directive(directive);
    }
    log_config
}
