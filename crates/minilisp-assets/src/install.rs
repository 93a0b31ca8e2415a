//! Writing the bundle into the site's public directory.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::bundle::AssetBundle;
use crate::error::{FetchError, FetchResult};

/// A file written by [`install_bundle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledFile {
    /// Archive entry the file came from.
    pub name: &'static str,
    /// Path written.
    pub path: PathBuf,
    /// Bytes written.
    pub size: u64,
}

/// Result of a successful install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledAssets {
    /// Installed files, module first.
    pub files: Vec<InstalledFile>,
}

impl InstalledAssets {
    /// Total bytes written.
    #[must_use]
    pub fn total_bytes(&self) -> u64 {
        self.files
            .iter()
            .fold(0u64, |acc, f| acc.saturating_add(f.size))
    }
}

/// Write both entries of `bundle` into `destination_dir`, overwriting any
/// existing files.
///
/// The directory must already exist. The two writes are independent: if
/// the second fails, the first file stays in place.
///
/// # Errors
///
/// Returns [`FetchError::FilesystemFailure`] if the destination is missing,
/// not a directory, or a write fails.
pub async fn install_bundle(
    bundle: &AssetBundle,
    destination_dir: &Path,
) -> FetchResult<InstalledAssets> {
    ensure_destination(destination_dir).await?;

    let mut files = Vec::with_capacity(2);
    for entry in bundle.entries() {
        let path = destination_dir.join(entry.name);
        tokio::fs::write(&path, &entry.bytes)
            .await
            .map_err(|e| FetchError::FilesystemFailure {
                path: path.clone(),
                source: e,
            })?;

        let size = u64::try_from(entry.bytes.len()).unwrap_or(u64::MAX);
        info!(path = %path.display(), bytes = size, "installed");
        files.push(InstalledFile {
            name: entry.name,
            path,
            size,
        });
    }

    Ok(InstalledAssets { files })
}

async fn ensure_destination(dir: &Path) -> FetchResult<()> {
    let metadata = tokio::fs::metadata(dir)
        .await
        .map_err(|e| FetchError::FilesystemFailure {
            path: dir.to_path_buf(),
            source: e,
        })?;

    if !metadata.is_dir() {
        return Err(FetchError::FilesystemFailure {
            path: dir.to_path_buf(),
            source: std::io::Error::new(
                std::io::ErrorKind::NotADirectory,
                "destination is not a directory",
            ),
        });
    }

    Ok(())
}
