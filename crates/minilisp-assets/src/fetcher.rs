//! The resolve → download → decode → install pipeline.

use std::path::Path;

use tracing::{debug, info, warn};
use url::Url;

use crate::bundle::{AssetBundle, DEFAULT_MAX_ENTRY_SIZE};
use crate::download::{Downloader, HttpSettings};
use crate::error::FetchResult;
use crate::install::{InstalledAssets, install_bundle};
use crate::source::{parse_http_url, resolve_source_url};

/// Downloads the release archive and installs its two assets.
#[derive(Debug, Clone)]
pub struct AssetFetcher {
    downloader: Downloader,
    proxy_endpoint: Url,
    max_entry_size: u64,
}

impl AssetFetcher {
    /// Create a fetcher with default HTTP settings and proxy endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::HttpClient`](crate::FetchError::HttpClient) if
    /// the HTTP client cannot be built.
    pub fn new() -> FetchResult<Self> {
        Ok(Self {
            downloader: Downloader::new(&HttpSettings::default())?,
            proxy_endpoint: parse_http_url(minilisp_config::DEFAULT_PROXY_ENDPOINT)?,
            max_entry_size: DEFAULT_MAX_ENTRY_SIZE,
        })
    }

    /// Create a fetcher from loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the proxy endpoint is not an http(s) URL or the
    /// HTTP client cannot be built.
    pub fn from_config(config: &minilisp_config::Config) -> FetchResult<Self> {
        Ok(Self {
            downloader: Downloader::new(&HttpSettings::from_config(&config.http))?,
            proxy_endpoint: parse_http_url(&config.source.proxy_endpoint)?,
            max_entry_size: config.http.max_entry_size,
        })
    }

    /// Override the proxy endpoint.
    #[must_use]
    pub fn with_proxy_endpoint(mut self, endpoint: Url) -> Self {
        self.proxy_endpoint = endpoint;
        self
    }

    /// Override the per-entry decompressed size limit.
    #[must_use]
    pub fn with_max_entry_size(mut self, bytes: u64) -> Self {
        self.max_entry_size = bytes;
        self
    }

    /// Replace the HTTP settings.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::HttpClient`](crate::FetchError::HttpClient) if
    /// the HTTP client cannot be rebuilt.
    pub fn with_http_settings(mut self, settings: &HttpSettings) -> FetchResult<Self> {
        self.downloader = Downloader::new(settings)?;
        Ok(self)
    }

    /// Proxy endpoint used when `use_proxy` is set.
    #[must_use]
    pub fn proxy_endpoint(&self) -> &Url {
        &self.proxy_endpoint
    }

    /// The URL that would be requested for `base_url`.
    ///
    /// # Errors
    ///
    /// See [`resolve_source_url`].
    pub fn effective_url(&self, base_url: &Url, use_proxy: bool) -> FetchResult<Url> {
        resolve_source_url(base_url, use_proxy, &self.proxy_endpoint)
    }

    /// Download the archive and extract both required entries, without
    /// touching the filesystem.
    ///
    /// # Errors
    ///
    /// Any [`FetchError`](crate::FetchError) except `FilesystemFailure`.
    pub async fn fetch_bundle(&self, base_url: &Url, use_proxy: bool) -> FetchResult<AssetBundle> {
        let url = self.effective_url(base_url, use_proxy)?;
        if use_proxy {
            warn!(proxy = %self.proxy_endpoint, "downloading through proxy");
        }
        debug!(url = %url, "resolved source URL");

        let bytes = self.downloader.fetch(&url).await?;
        AssetBundle::from_archive(&bytes, self.max_entry_size)
    }

    /// Fetch the bundle and write it into `destination_dir`.
    ///
    /// Nothing is written unless both entries were extracted.
    ///
    /// # Errors
    ///
    /// Any [`FetchError`](crate::FetchError); all of them abort the run.
    pub async fn fetch_and_install(
        &self,
        base_url: &Url,
        use_proxy: bool,
        destination_dir: &Path,
    ) -> FetchResult<InstalledAssets> {
        let bundle = self.fetch_bundle(base_url, use_proxy).await?;
        let installed = install_bundle(&bundle, destination_dir).await?;
        info!(
            destination = %destination_dir.display(),
            files = installed.files.len(),
            bytes = installed.total_bytes(),
            "assets installed"
        );
        Ok(installed)
    }
}
