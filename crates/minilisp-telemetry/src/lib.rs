//! Logging for the mini_lisp asset installer.
//!
//! Wraps `tracing_subscriber` behind a small [`LogConfig`] builder.
//!
//! # Example
//!
//! ```rust,no_run
//! use minilisp_telemetry::{LogConfig, LogFormat, setup_logging};
//!
//! # fn main() -> Result<(), minilisp_telemetry::TelemetryError> {
//! let config = LogConfig::new("debug")
//!     .with_format(LogFormat::Pretty)
//!     .with_directive("reqwest=warn");
//!
//! setup_logging(&config)?;
//! tracing::info!("ready");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod error;
mod logging;

pub use error::{TelemetryError, TelemetryResult};
#[cfg(feature = "config")]
pub use logging::from_config;
pub use logging::{LogConfig, LogFormat, setup_default_logging, setup_logging};
