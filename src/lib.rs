// src/lib.rs

//! apkmeta
//!
//! Structured access to Android package metadata without reimplementing the
//! binary manifest format. The badging dump of the platform inspection tool
//! is parsed into a typed model; derived artifacts (density-specific icons,
//! adaptive-icon status, signing fingerprint, install eligibility) are
//! resolved from the APK archive and external verification tools.
//!
//! # Architecture
//!
//! - Dump text -> [`dump`] parser -> [`metadata::PackageMetadata`]
//! - Metadata + archive -> [`icon`] resolution and adaptive-icon detection
//! - Metadata + verifier -> [`signature`] fingerprint -> [`install`] verdict
//! - External collaborators (dump tool, archive reader, verifiers) sit
//!   behind traits so embedders and tests can substitute them

pub mod analyzer;
pub mod archive;
pub mod density;
pub mod dump;
mod error;
pub mod icon;
pub mod install;
pub mod metadata;
pub mod signature;

pub use analyzer::{AaptDump, DumpSource, analyze, analyze_dump, analyze_with};
pub use archive::{ArchiveSource, ZipSource};
pub use dump::{DISALLOWED_DUPLICATE_TAGS, ParsedDump, ParsedValue};
pub use error::{Error, Result};
pub use icon::{AdaptiveIconResult, IconResolver, RASTER_REWRITE_PATTERNS};
pub use install::UninstallableReason;
pub use metadata::PackageMetadata;
pub use signature::{SignatureExtractor, SigningResult, ToolVerifier, Verifier};
