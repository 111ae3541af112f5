// src/metadata.rs

//! Typed package metadata extracted from a parsed badging dump

use crate::archive::{ArchiveSource, ZipSource};
use crate::dump::ParsedDump;
use crate::icon::{self, AdaptiveIconResult, IconResolver};
use crate::install::{self, UninstallableReason};
use crate::signature::{SignatureExtractor, SigningResult, ToolVerifier, Verifier};
use once_cell::sync::OnceCell;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Metadata of one APK, extracted from its badging dump.
///
/// Version and SDK fields stay unparsed strings; numeric semantics are the
/// caller's concern. The signing result is computed at most once per
/// instance and cached.
#[derive(Debug, Clone, Serialize)]
pub struct PackageMetadata {
    pub package_name: String,
    pub version_code: String,
    pub version_name: String,
    pub sdk_version: String,
    pub target_sdk_version: String,
    /// Default-locale label.
    pub label: String,
    /// Locale code -> localized label.
    pub labels: BTreeMap<String, String>,
    /// Default icon resource path.
    pub icon: String,
    /// Density -> icon resource path.
    pub icons: BTreeMap<u32, String>,
    pub test_only: bool,
    /// The source archive; owned externally, never moved or deleted here.
    pub filepath: PathBuf,

    #[serde(skip)]
    signing: OnceCell<SigningResult>,
}

impl PackageMetadata {
    /// Build metadata from a parsed dump. Missing keys yield empty values,
    /// never an error.
    pub fn from_dump(dump: &ParsedDump, filepath: &Path) -> Self {
        let package = dump.get("package");
        let application = dump.get("application");

        let field = |name: &str| -> String {
            package
                .and_then(|p| p.get(name))
                .unwrap_or_default()
                .to_string()
        };

        let label = dump
            .get("application-label")
            .and_then(|v| v.as_str())
            .or_else(|| application.and_then(|a| a.get("label")))
            .unwrap_or_default()
            .to_string();

        let mut labels = BTreeMap::new();
        let mut icons = BTreeMap::new();
        for (key, value) in dump.iter() {
            if let Some(locale) = key.strip_prefix("application-label-") {
                if !locale.is_empty() {
                    if let Some(text) = value.as_str() {
                        labels.insert(locale.to_string(), text.to_string());
                    }
                }
            } else if let Some(density) = key.strip_prefix("application-icon-") {
                if let Ok(density) = density.parse::<u32>() {
                    if density > 0 {
                        if let Some(path) = value.as_str() {
                            icons.insert(density, path.to_string());
                        }
                    }
                }
            }
        }

        let scalar = |name: &str| -> String {
            dump.get(name)
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string()
        };

        Self {
            package_name: field("name"),
            version_code: field("versionCode"),
            version_name: field("versionName"),
            sdk_version: scalar("sdkVersion"),
            target_sdk_version: scalar("targetSdkVersion"),
            label,
            labels,
            icon: application
                .and_then(|a| a.get("icon"))
                .unwrap_or_default()
                .to_string(),
            icons,
            test_only: dump.test_only(),
            filepath: filepath.to_path_buf(),
            signing: OnceCell::new(),
        }
    }

    pub fn min_sdk(&self) -> Option<u32> {
        self.sdk_version.parse().ok()
    }

    pub fn target_sdk(&self) -> Option<u32> {
        self.target_sdk_version.parse().ok()
    }

    /// Densities with an icon variant, ascending.
    pub fn available_densities(&self) -> Vec<u32> {
        self.icons.keys().copied().collect()
    }

    /// Resolve icon bytes from the source archive. See
    /// [`IconResolver::resolve`] for the rewrite behavior.
    pub fn icon_file(&self, density: Option<u32>, want_raster: bool) -> Option<Vec<u8>> {
        let mut archive = self.open_archive()?;
        self.icon_file_from(&mut archive, density, want_raster)
    }

    /// Same as [`icon_file`](Self::icon_file) against an injected archive.
    pub fn icon_file_from(
        &self,
        archive: &mut dyn ArchiveSource,
        density: Option<u32>,
        want_raster: bool,
    ) -> Option<Vec<u8>> {
        IconResolver::new(&self.icons, &self.icon).resolve(archive, density, want_raster)
    }

    /// The signing result, computed on first access with the platform
    /// toolchain and cached.
    pub fn signing_result(&self) -> &SigningResult {
        self.signing
            .get_or_init(|| self.compute_signing(&ToolVerifier::default()))
    }

    /// The signing result using an injected verifier. Still computed at
    /// most once per instance.
    pub fn signing_result_with(&self, verifier: &dyn Verifier) -> &SigningResult {
        self.signing.get_or_init(|| self.compute_signing(verifier))
    }

    fn compute_signing(&self, verifier: &dyn Verifier) -> SigningResult {
        let extractor = SignatureExtractor::new(verifier);
        match self.open_archive() {
            Some(mut archive) => extractor.extract(&self.filepath, Some(&mut archive)),
            None => extractor.extract(&self.filepath, None),
        }
    }

    /// SHA-1 fingerprint of the signing certificate, lowercased hex.
    pub fn signature(&self) -> Option<&str> {
        self.signing_result().signature.as_deref()
    }

    pub fn is_signed(&self) -> bool {
        self.signing_result().is_signed()
    }

    pub fn uninstallable_reasons(&self) -> Vec<UninstallableReason> {
        install::uninstallable_reasons(self.signing_result(), self.test_only)
    }

    pub fn is_installable(&self) -> bool {
        self.uninstallable_reasons().is_empty()
    }

    /// Adaptive-icon status, inspected on demand from the source archive.
    pub fn adaptive_icon_result(&self) -> AdaptiveIconResult {
        match self.open_archive() {
            Some(mut archive) => self.adaptive_icon_result_from(&mut archive),
            None => AdaptiveIconResult::default(),
        }
    }

    /// Same as [`adaptive_icon_result`](Self::adaptive_icon_result) against
    /// an injected archive.
    pub fn adaptive_icon_result_from(
        &self,
        archive: &mut dyn ArchiveSource,
    ) -> AdaptiveIconResult {
        let gate_sdk = self.min_sdk().or_else(|| self.target_sdk());
        icon::detect_adaptive_icon(archive, &self.icon, gate_sdk)
    }

    pub fn adaptive_icon(&self) -> bool {
        self.adaptive_icon_result().is_adaptive
    }

    pub fn backward_compatible_adaptive_icon(&self) -> bool {
        self.adaptive_icon_result().has_backward_compatible_fallback
    }

    fn open_archive(&self) -> Option<ZipSource> {
        match ZipSource::open(&self.filepath) {
            Ok(source) => Some(source),
            Err(e) => {
                debug!("Cannot open {}: {}", self.filepath.display(), e);
                None
            }
        }
    }
}
