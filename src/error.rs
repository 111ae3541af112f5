// src/error.rs

//! Error types for apkmeta

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A non-repeatable manifest tag appeared more than once in the badging
    /// dump. This is the only condition that aborts an analysis.
    #[error("Invalid manifest: {0}")]
    ManifestInvalid(String),

    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Archive error: {0}")]
    ArchiveError(String),
}
