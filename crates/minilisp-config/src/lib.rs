#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
//! Configuration for the mini_lisp asset installer.
//!
//! # Usage
//!
//! ```rust,no_run
//! use minilisp_config::Config;
//!
//! // defaults → optional file → environment
//! let config = Config::load(None).unwrap();
//! println!("Fetching from: {}", config.source.url);
//! ```
//!
//! # Precedence
//!
//! From highest to lowest priority:
//!
//! 1. **Environment variables** (`USE_CF_PROXY`, `MINILISP_ASSETS_URL`,
//!    `MINILISP_ASSETS_DEST`, `MINILISP_LOG`)
//! 2. **Config file** passed with `--config`
//! 3. **Embedded defaults** (`defaults.toml` compiled into the binary)
//!
//! Command-line flags are applied on top by the CLI.

/// Environment variable overrides.
pub mod env;
/// Configuration error types.
pub mod error;
/// Configuration file loading.
pub mod loader;
/// Deep merging of TOML trees.
pub mod merge;
/// Configuration struct definitions.
pub mod types;
/// Configuration validation rules.
pub mod validate;

use std::collections::HashMap;
use std::path::Path;

pub use error::{ConfigError, ConfigResult};
pub use types::*;

impl Config {
    /// Load configuration from defaults, an optional file, and the process
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file is missing or malformed, or the
    /// final configuration fails validation.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        loader::load(path, &env::collect_env_vars())
    }

    /// Load configuration with an explicit environment snapshot instead of
    /// the process environment.
    ///
    /// # Errors
    ///
    /// See [`Config::load`].
    pub fn load_with_env(
        path: Option<&Path>,
        env: &HashMap<String, String>,
    ) -> ConfigResult<Self> {
        loader::load(path, env)
    }

    /// Load a single file on top of the defaults, ignoring the environment.
    ///
    /// # Errors
    ///
    /// See [`Config::load`].
    pub fn load_file(path: &Path) -> ConfigResult<Self> {
        loader::load_file(path)
    }
}
