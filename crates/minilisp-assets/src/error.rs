//! Asset fetch error types.

use std::path::PathBuf;

/// Errors from fetching and installing the WebAssembly bundle.
///
/// Every variant is fatal: nothing is retried and the run aborts.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The source or proxy URL is not an absolute http(s) URL.
    #[error("invalid URL '{url}': {message}")]
    InvalidUrl {
        /// The offending URL.
        url: String,
        /// Why it was rejected.
        message: String,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {message}")]
    HttpClient {
        /// Builder error description.
        message: String,
    },

    /// The request could not complete or returned an error status.
    #[error("download from {url} failed: {message}")]
    NetworkFailure {
        /// Effective request URL.
        url: String,
        /// Transport error or status description.
        message: String,
    },

    /// The response body exceeds the download limit.
    #[error("archive too large: {size} bytes (limit: {limit} bytes)")]
    ArchiveTooLarge {
        /// Size seen so far (or advertised) in bytes.
        size: u64,
        /// Maximum allowed size in bytes.
        limit: u64,
    },

    /// The downloaded bytes are not a readable zip archive.
    #[error("invalid archive: {message}")]
    InvalidArchive {
        /// Description of the decode failure.
        message: String,
    },

    /// A required entry is absent from the archive.
    #[error("archive is missing required entry '{name}'")]
    MissingEntry {
        /// Name of the absent entry.
        name: String,
    },

    /// The destination could not be written.
    #[error("filesystem error at {}: {source}", path.display())]
    FilesystemFailure {
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Result type for asset fetch operations.
pub type FetchResult<T> = Result<T, FetchError>;
