//! Installs the mini_lisp WebAssembly interpreter into the course site.
//!
//! The interpreter ships as a zip archive on a GitHub release. This crate
//! downloads it (optionally through a relay proxy), pulls out
//! `mini_lisp.wasm` and `mini_lisp.js`, and writes them into the site's
//! public asset directory:
//!
//! - [`source`]: effective URL computation, including proxy wrapping
//! - [`download`]: single-shot HTTP GET with a size cap
//! - [`bundle`]: exact-name lookup of the two required archive entries
//! - [`install`]: writes into the destination directory
//! - [`AssetFetcher`]: the whole pipeline
//!
//! # Example
//!
//! ```rust,no_run
//! # async fn run() -> Result<(), minilisp_assets::FetchError> {
//! use std::path::Path;
//!
//! let url = url::Url::parse(minilisp_config::DEFAULT_SOURCE_URL).unwrap();
//! let installed =
//!     minilisp_assets::fetch_and_install_assets(&url, false, Path::new("docs/.vuepress/public"))
//!         .await?;
//! for file in &installed.files {
//!     println!("{}", file.path.display());
//! }
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod bundle;
pub mod download;
pub mod error;
mod fetcher;
pub mod install;
pub mod source;

use std::path::Path;

use url::Url;

pub use bundle::{AssetBundle, AssetEntry, LOADER_ENTRY, MODULE_ENTRY, REQUIRED_ENTRIES};
pub use download::{Downloader, HttpSettings};
pub use error::{FetchError, FetchResult};
pub use fetcher::AssetFetcher;
pub use install::{InstalledAssets, InstalledFile};

/// Fetch the archive at `base_url` and install its assets into
/// `destination_dir`, using default HTTP settings and proxy endpoint.
///
/// # Errors
///
/// Any [`FetchError`]; nothing is retried.
pub async fn fetch_and_install_assets(
    base_url: &Url,
    use_proxy: bool,
    destination_dir: &Path,
) -> FetchResult<InstalledAssets> {
    AssetFetcher::new()?
        .fetch_and_install(base_url, use_proxy, destination_dir)
        .await
}
