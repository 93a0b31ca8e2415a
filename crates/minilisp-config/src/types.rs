//! Configuration types for the asset installer.
//!
//! Every struct implements [`Default`] with the values from the embedded
//! `defaults.toml`, so a bare `[section]` header produces a working
//! configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Release archive published alongside mini_lisp.
pub const DEFAULT_SOURCE_URL: &str =
    "https://github.com/pku-software/mini_lisp/releases/download/v20220301.r1/mini_lisp_wasm.zip";

/// Relay used when `USE_CF_PROXY` is set.
pub const DEFAULT_PROXY_ENDPOINT: &str = "https://v4.vscch.tk/proxy";

/// Public asset directory of the course site, relative to [`project_root`].
pub const DEFAULT_DESTINATION: &str = "docs/.vuepress/public";

/// Root of the site checkout this workspace lives in.
///
/// Fixed at build time from this crate's manifest location
/// (`<root>/crates/minilisp-config`), so it does not depend on the working
/// directory the binary is started from.
#[must_use]
pub fn project_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .ancestors()
        .nth(2)
        .unwrap_or(manifest_dir)
        .to_path_buf()
}

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where the release archive comes from.
    pub source: SourceSection,
    /// Where the extracted assets go.
    pub install: InstallSection,
    /// HTTP client limits.
    pub http: HttpSection,
    /// Logging level, format, and per-crate directives.
    pub logging: LoggingSection,
}

// ---------------------------------------------------------------------------
// SourceSection
// ---------------------------------------------------------------------------

/// Release archive location and proxy settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSection {
    /// Absolute http(s) URL of the zip archive.
    pub url: String,
    /// Proxy endpoint; the archive URL is passed as its `target` parameter.
    pub proxy_endpoint: String,
    /// Route the download through `proxy_endpoint`.
    pub use_proxy: bool,
}

impl Default for SourceSection {
    fn default() -> Self {
        Self {
            url: DEFAULT_SOURCE_URL.to_owned(),
            proxy_endpoint: DEFAULT_PROXY_ENDPOINT.to_owned(),
            use_proxy: false,
        }
    }
}

// ---------------------------------------------------------------------------
// InstallSection
// ---------------------------------------------------------------------------

/// Install target.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallSection {
    /// Directory receiving `mini_lisp.wasm` and `mini_lisp.js`. Must exist.
    pub destination: String,
}

impl Default for InstallSection {
    fn default() -> Self {
        Self {
            destination: DEFAULT_DESTINATION.to_owned(),
        }
    }
}

impl InstallSection {
    /// The destination as a path; relative values resolve against
    /// [`project_root`].
    #[must_use]
    pub fn destination_path(&self) -> PathBuf {
        let destination = Path::new(&self.destination);
        if destination.is_absolute() {
            destination.to_path_buf()
        } else {
            project_root().join(destination)
        }
    }
}

// ---------------------------------------------------------------------------
// HttpSection
// ---------------------------------------------------------------------------

/// HTTP client timeouts and download limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSection {
    /// Whole-request timeout in seconds.
    pub timeout_secs: u64,
    /// Connection timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Maximum archive size in bytes.
    pub max_download_size: u64,
    /// Maximum decompressed size of a single entry in bytes.
    pub max_entry_size: u64,
    /// `User-Agent` header sent with the request.
    pub user_agent: String,
}

impl Default for HttpSection {
    fn default() -> Self {
        Self {
            timeout_secs: 120,
            connect_timeout_secs: 30,
            max_download_size: 52_428_800,
            max_entry_size: 104_857_600,
            user_agent: "minilisp-assets".to_owned(),
        }
    }
}

// ---------------------------------------------------------------------------
// LoggingSection
// ---------------------------------------------------------------------------

/// Logging and tracing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Global log level filter (`"trace"`, `"debug"`, `"info"`, `"warn"`,
    /// `"error"`).
    pub level: String,
    /// Output format: `"pretty"`, `"compact"`, `"json"`, or `"full"`.
    pub format: String,
    /// Per-crate tracing directives (e.g. `["reqwest=warn"]`).
    pub directives: Vec<String>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: "compact".to_owned(),
            directives: Vec::new(),
        }
    }
}
