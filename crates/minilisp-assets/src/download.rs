//! Archive download over HTTP(S).
//!
//! One GET, no retries. The body is streamed into memory under a size cap.

use std::time::Duration;

use futures::StreamExt;
use tracing::debug;
use url::Url;

use crate::error::{FetchError, FetchResult};

/// Default maximum archive size (50 MB).
pub const DEFAULT_MAX_DOWNLOAD_SIZE: u64 = 50 * 1024 * 1024;

/// Default HTTP request timeout (120 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Default connection timeout (30 seconds).
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Release downloads bounce through a CDN redirect.
const MAX_REDIRECTS: usize = 10;

/// Client settings for [`Downloader`].
#[derive(Debug, Clone)]
pub struct HttpSettings {
    /// Whole-request timeout.
    pub timeout: Duration,
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// Maximum body size in bytes.
    pub max_download_size: u64,
    /// `User-Agent` header.
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            max_download_size: DEFAULT_MAX_DOWNLOAD_SIZE,
            user_agent: concat!("minilisp-assets/", env!("CARGO_PKG_VERSION")).to_owned(),
        }
    }
}

impl HttpSettings {
    /// Build settings from the `[http]` config section.
    #[must_use]
    pub fn from_config(http: &minilisp_config::HttpSection) -> Self {
        Self {
            timeout: Duration::from_secs(http.timeout_secs),
            connect_timeout: Duration::from_secs(http.connect_timeout_secs),
            max_download_size: http.max_download_size,
            user_agent: http.user_agent.clone(),
        }
    }
}

/// Fetches archive bytes.
#[derive(Debug, Clone)]
pub struct Downloader {
    client: reqwest::Client,
    max_download_size: u64,
}

impl Downloader {
    /// Build a downloader.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::HttpClient`] if the client cannot be built
    /// (e.g. TLS backend unavailable).
    pub fn new(settings: &HttpSettings) -> FetchResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .connect_timeout(settings.connect_timeout)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .user_agent(settings.user_agent.as_str())
            .build()
            .map_err(|e| FetchError::HttpClient {
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            max_download_size: settings.max_download_size,
        })
    }

    /// Maximum body size this downloader accepts.
    #[must_use]
    pub fn max_download_size(&self) -> u64 {
        self.max_download_size
    }

    /// GET `url` and return the full body.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::NetworkFailure`] on transport errors or a
    /// non-2xx status, and [`FetchError::ArchiveTooLarge`] if the body
    /// exceeds the size limit.
    pub async fn fetch(&self, url: &Url) -> FetchResult<Vec<u8>> {
        debug!(url = %url, "downloading archive");

        let response =
            self.client
                .get(url.clone())
                .send()
                .await
                .map_err(|e| FetchError::NetworkFailure {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::NetworkFailure {
                url: url.to_string(),
                message: format!("server returned {status}"),
            });
        }

        // Check Content-Length if available
        if let Some(len) = response.content_length()
            && len > self.max_download_size
        {
            return Err(FetchError::ArchiveTooLarge {
                size: len,
                limit: self.max_download_size,
            });
        }

        let bytes = download_with_limit(url, response, self.max_download_size).await?;
        debug!(url = %url, bytes = bytes.len(), "archive downloaded");
        Ok(bytes)
    }
}

/// Stream a response body into memory, failing once it passes `max_size`.
async fn download_with_limit(
    url: &Url,
    response: reqwest::Response,
    max_size: u64,
) -> FetchResult<Vec<u8>> {
    let capacity =
        usize::try_from(response.content_length().unwrap_or(0).min(max_size)).unwrap_or(0);
    let mut bytes = Vec::with_capacity(capacity);
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| FetchError::NetworkFailure {
            url: url.to_string(),
            message: format!("error reading body: {e}"),
        })?;
        bytes.extend_from_slice(&chunk);
        let current_size = u64::try_from(bytes.len()).unwrap_or(u64::MAX);
        if current_size > max_size {
            return Err(FetchError::ArchiveTooLarge {
                size: current_size,
                limit: max_size,
            });
        }
    }

    Ok(bytes)
}
