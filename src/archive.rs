// src/archive.rs

//! Archive access for APK contents
//!
//! APKs are ZIP containers. [`ArchiveSource`] is the seam between the
//! resolution logic and the container format, so tests and embedders can
//! substitute their own backing store.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::warn;
use zip::ZipArchive;
use zip::result::ZipError;

/// Maximum size of a single entry read out of an APK (64 MB). Icon and
/// certificate entries are far smaller; anything larger is suspect.
pub const MAX_ENTRY_SIZE: u64 = 64 * 1024 * 1024;

/// Read access to entries of a package archive.
///
/// Implementations must be reentrant: one analysis may query the same
/// source several times.
pub trait ArchiveSource {
    /// Decompressed bytes of the entry at `path`, or `None` when absent.
    fn read_entry(&mut self, path: &str) -> Result<Option<Vec<u8>>>;

    /// All entry paths in the archive.
    fn entry_names(&mut self) -> Vec<String>;

    /// Whether an entry exists at `path`.
    fn has_entry(&mut self, path: &str) -> bool {
        matches!(self.read_entry(path), Ok(Some(_)))
    }
}

/// [`ArchiveSource`] over a ZIP file on disk.
pub struct ZipSource {
    archive: ZipArchive<File>,
}

impl ZipSource {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .map_err(|e| Error::IoError(format!("Failed to open {}: {}", path.display(), e)))?;
        let archive = ZipArchive::new(file).map_err(|e| {
            Error::ArchiveError(format!("Failed to read {} as ZIP: {}", path.display(), e))
        })?;
        Ok(Self { archive })
    }
}

impl ArchiveSource for ZipSource {
    fn read_entry(&mut self, path: &str) -> Result<Option<Vec<u8>>> {
        match self.archive.by_name(path) {
            Ok(mut entry) => {
                if entry.size() > MAX_ENTRY_SIZE {
                    warn!("Skipping oversized entry: {} ({} bytes)", path, entry.size());
                    return Ok(None);
                }
                let mut content = Vec::with_capacity(entry.size() as usize);
                entry.read_to_end(&mut content).map_err(|e| {
                    Error::ArchiveError(format!("Failed to decompress {}: {}", path, e))
                })?;
                Ok(Some(content))
            }
            Err(ZipError::FileNotFound) => Ok(None),
            Err(e) => Err(Error::ArchiveError(format!(
                "Failed to look up {}: {}",
                path, e
            ))),
        }
    }

    fn entry_names(&mut self) -> Vec<String> {
        self.archive.file_names().map(String::from).collect()
    }

    fn has_entry(&mut self, path: &str) -> bool {
        self.archive.by_name(path).is_ok()
    }
}
