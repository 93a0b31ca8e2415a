//! Lookup of the two required entries inside the release archive.
//!
//! An [`AssetBundle`] only exists once both entries have been found and
//! fully decompressed, so nothing can be written for a partial archive.

use std::io::{Cursor, Read, Seek};

use tracing::debug;
use zip::ZipArchive;

use crate::error::{FetchError, FetchResult};

/// Compiled interpreter module.
pub const MODULE_ENTRY: &str = "mini_lisp.wasm";

/// JavaScript loader for [`MODULE_ENTRY`].
pub const LOADER_ENTRY: &str = "mini_lisp.js";

/// Entries that must be present, in lookup order.
pub const REQUIRED_ENTRIES: [&str; 2] = [MODULE_ENTRY, LOADER_ENTRY];

/// Default cap on a single entry's decompressed size (100 MB).
pub const DEFAULT_MAX_ENTRY_SIZE: u64 = 100 * 1024 * 1024;

/// One named payload taken from the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetEntry {
    /// Entry name, also used as the installed file name.
    pub name: &'static str,
    /// Decompressed bytes.
    pub bytes: Vec<u8>,
}

/// Both required entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetBundle {
    /// `mini_lisp.wasm`.
    pub module: AssetEntry,
    /// `mini_lisp.js`.
    pub loader: AssetEntry,
}

impl AssetBundle {
    /// Decode `bytes` as a zip archive and pull out the required entries.
    ///
    /// Presence of every required name is checked before anything is
    /// decompressed, and names are matched exactly (no directory prefix).
    ///
    /// # Errors
    ///
    /// - [`FetchError::InvalidArchive`] if `bytes` is not a zip archive, an
    ///   entry is corrupt, or an entry exceeds `max_entry_size`.
    /// - [`FetchError::MissingEntry`] naming the first absent entry.
    pub fn from_archive(bytes: &[u8], max_entry_size: u64) -> FetchResult<Self> {
        let mut archive =
            ZipArchive::new(Cursor::new(bytes)).map_err(|e| FetchError::InvalidArchive {
                message: e.to_string(),
            })?;
        debug!(entries = archive.len(), "archive opened");

        let [module_index, loader_index] = REQUIRED_ENTRIES.map(|name| archive.index_for_name(name));
        let module_index = module_index.ok_or_else(|| missing(MODULE_ENTRY))?;
        let loader_index = loader_index.ok_or_else(|| missing(LOADER_ENTRY))?;

        let module = read_entry(&mut archive, module_index, MODULE_ENTRY, max_entry_size)?;
        let loader = read_entry(&mut archive, loader_index, LOADER_ENTRY, max_entry_size)?;

        Ok(Self { module, loader })
    }

    /// Entries in install order.
    #[must_use]
    pub fn entries(&self) -> [&AssetEntry; 2] {
        [&self.module, &self.loader]
    }
}

fn missing(name: &str) -> FetchError {
    FetchError::MissingEntry {
        name: name.to_owned(),
    }
}

fn read_entry<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    index: usize,
    name: &'static str,
    max_entry_size: u64,
) -> FetchResult<AssetEntry> {
    let entry = archive
        .by_index(index)
        .map_err(|e| FetchError::InvalidArchive {
            message: format!("failed to open entry '{name}': {e}"),
        })?;

    if entry.is_dir() {
        return Err(missing(name));
    }

    let declared = entry.size();
    if declared > max_entry_size {
        return Err(FetchError::InvalidArchive {
            message: format!(
                "entry '{name}' is {declared} bytes, exceeding the {max_entry_size} byte limit"
            ),
        });
    }

    // The declared size can lie; cap the reader as well.
    let capacity = usize::try_from(declared).unwrap_or(0);
    let mut bytes = Vec::with_capacity(capacity);
    entry
        .take(max_entry_size.saturating_add(1))
        .read_to_end(&mut bytes)
        .map_err(|e| FetchError::InvalidArchive {
            message: format!("failed to decompress entry '{name}': {e}"),
        })?;

    let actual = u64::try_from(bytes.len()).unwrap_or(u64::MAX);
    if actual > max_entry_size {
        return Err(FetchError::InvalidArchive {
            message: format!(
                "entry '{name}' decompresses past the {max_entry_size} byte limit"
            ),
        });
    }

    debug!(entry = name, bytes = actual, "entry extracted");
    Ok(AssetEntry { name, bytes })
}
