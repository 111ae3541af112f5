// src/icon.rs

//! Icon resolution and adaptive-icon detection
//!
//! Badging reports one icon resource path per density. Vector and adaptive
//! icons point at `.xml` resources; callers that want raster bytes get the
//! path rewritten to the density-qualified `.png` sibling that aapt packs
//! alongside, via an ordered first-match-wins rewrite chain.

use crate::archive::ArchiveSource;
use crate::density;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Ordered source patterns of the raster rewrite chain. The first matching
/// pattern wins; all three rewrite to `res/<family>-<bucket>-v4/<name>.png`.
pub const RASTER_REWRITE_PATTERNS: [&str; 3] = [
    // Adaptive-icon convention.
    r"^res/(drawable|mipmap)-anydpi-v\d+/(.+)\.xml$",
    // Non-standard adaptive packaging with a density qualifier.
    r"^res/(drawable|mipmap)-[a-z0-9]+dpi-v\d+/(.+)\.xml$",
    // Plain vector drawable, no qualifier.
    r"^res/(drawable|mipmap)/(.+)\.xml$",
];

static RASTER_REWRITE_RULES: Lazy<Vec<Regex>> = Lazy::new(|| {
    RASTER_REWRITE_PATTERNS
        .iter()
        .map(|pattern| Regex::new(pattern).unwrap())
        .collect()
});

/// Resource directory of adaptive icons.
pub const ADAPTIVE_ICON_DIR: &str = "res/mipmap-anydpi-v26/";

/// Element that marks an icon XML as adaptive.
pub const ADAPTIVE_ICON_MARKER: &str = "<adaptive-icon";

/// First platform version with adaptive-icon support.
pub const ADAPTIVE_ICON_MIN_SDK: u32 = 26;

/// Index of the first rewrite rule matching `path`, if any.
pub fn matching_rule_index(path: &str) -> Option<usize> {
    RASTER_REWRITE_RULES.iter().position(|re| re.is_match(path))
}

/// Rewrite a vector-icon resource path into its raster sibling for the
/// given density bucket. `None` when no rule matches.
pub fn rasterize_candidate(path: &str, bucket: &str) -> Option<String> {
    for rule in RASTER_REWRITE_RULES.iter() {
        if let Some(caps) = rule.captures(path) {
            return Some(format!("res/{}-{}-v4/{}.png", &caps[1], bucket, &caps[2]));
        }
    }
    None
}

/// Resolves icon bytes out of a package archive.
pub struct IconResolver<'a> {
    icons: &'a BTreeMap<u32, String>,
    default_icon: &'a str,
}

impl<'a> IconResolver<'a> {
    pub fn new(icons: &'a BTreeMap<u32, String>, default_icon: &'a str) -> Self {
        Self {
            icons,
            default_icon,
        }
    }

    /// Resolve icon bytes for a density.
    ///
    /// With `want_raster`, `.xml` paths are rewritten through the chain
    /// before lookup; an unmatched path is looked up as-is. Missing paths
    /// and archive failures both surface as `None`.
    pub fn resolve(
        &self,
        archive: &mut dyn ArchiveSource,
        requested_density: Option<u32>,
        want_raster: bool,
    ) -> Option<Vec<u8>> {
        let path = match requested_density {
            Some(d) => self.icons.get(&d).cloned(),
            None => Some(self.default_icon.to_string()),
        };
        let path = path.filter(|p| !p.is_empty())?;

        let lookup = if want_raster && path.ends_with(".xml") {
            let bucket = density::bucket_for(requested_density);
            match rasterize_candidate(&path, bucket) {
                Some(candidate) => {
                    debug!("Rewrote vector icon {} -> {}", path, candidate);
                    candidate
                }
                None => path,
            }
        } else {
            path
        };

        match archive.read_entry(&lookup) {
            Ok(content) => content,
            Err(e) => {
                warn!("Icon lookup for {} failed: {}", lookup, e);
                None
            }
        }
    }
}

/// Adaptive-icon status of a package icon.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct AdaptiveIconResult {
    pub is_adaptive: bool,
    pub has_backward_compatible_fallback: bool,
}

/// Inspect the archive entry behind `icon_path` for adaptive-icon status.
///
/// `min_sdk` gates the fallback check: a raster sibling only matters when
/// devices below the adaptive-icon platform version can install the package.
/// Read failures degrade to a non-adaptive result.
pub fn detect_adaptive_icon(
    archive: &mut dyn ArchiveSource,
    icon_path: &str,
    min_sdk: Option<u32>,
) -> AdaptiveIconResult {
    if !icon_path.starts_with(ADAPTIVE_ICON_DIR) || !icon_path.ends_with(".xml") {
        return AdaptiveIconResult::default();
    }

    let content = match archive.read_entry(icon_path) {
        Ok(Some(content)) => content,
        Ok(None) => return AdaptiveIconResult::default(),
        Err(e) => {
            debug!("Adaptive icon inspection of {} failed: {}", icon_path, e);
            return AdaptiveIconResult::default();
        }
    };

    let is_adaptive = String::from_utf8_lossy(&content).contains(ADAPTIVE_ICON_MARKER);
    if !is_adaptive {
        return AdaptiveIconResult::default();
    }

    let needs_fallback = min_sdk.is_none_or(|sdk| sdk < ADAPTIVE_ICON_MIN_SDK);
    let has_backward_compatible_fallback = needs_fallback && {
        let sibling = raster_sibling(icon_path);
        archive.has_entry(&sibling)
    };

    AdaptiveIconResult {
        is_adaptive,
        has_backward_compatible_fallback,
    }
}

/// Highest-density raster sibling of an adaptive icon path.
fn raster_sibling(icon_path: &str) -> String {
    let name = icon_path
        .strip_prefix(ADAPTIVE_ICON_DIR)
        .unwrap_or(icon_path)
        .strip_suffix(".xml")
        .unwrap_or(icon_path);
    format!(
        "res/mipmap-{}-v4/{}.png",
        density::DEFAULT_BUCKET,
        name
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use std::collections::HashMap;

    struct MemorySource(HashMap<String, Vec<u8>>);

    impl MemorySource {
        fn new(entries: &[(&str, &[u8])]) -> Self {
            Self(
                entries
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_vec()))
                    .collect(),
            )
        }
    }

    impl ArchiveSource for MemorySource {
        fn read_entry(&mut self, path: &str) -> Result<Option<Vec<u8>>> {
            Ok(self.0.get(path).cloned())
        }

        fn entry_names(&mut self) -> Vec<String> {
            self.0.keys().cloned().collect()
        }
    }

    fn icons(entries: &[(u32, &str)]) -> BTreeMap<u32, String> {
        entries
            .iter()
            .map(|(d, p)| (*d, p.to_string()))
            .collect()
    }

    #[test]
    fn test_rewrite_adaptive_convention() {
        assert_eq!(
            rasterize_candidate("res/mipmap-anydpi-v26/ic_launcher.xml", "xxxhdpi"),
            Some("res/mipmap-xxxhdpi-v4/ic_launcher.png".to_string())
        );
    }

    #[test]
    fn test_rewrite_density_qualified_packaging() {
        assert_eq!(
            rasterize_candidate("res/drawable-hdpi-v4/ic_launcher.xml", "mdpi"),
            Some("res/drawable-mdpi-v4/ic_launcher.png".to_string())
        );
    }

    #[test]
    fn test_rewrite_plain_vector() {
        assert_eq!(
            rasterize_candidate("res/drawable/ic_launcher.xml", "xhdpi"),
            Some("res/drawable-xhdpi-v4/ic_launcher.png".to_string())
        );
    }

    #[test]
    fn test_rewrite_chain_order_adaptive_wins() {
        // An anydpi path also matches the generic density-qualified pattern;
        // the adaptive rule must win by order.
        let path = "res/mipmap-anydpi-v26/ic_launcher.xml";
        assert_eq!(matching_rule_index(path), Some(0));
        assert!(
            Regex::new(RASTER_REWRITE_PATTERNS[1])
                .unwrap()
                .is_match(path)
        );
    }

    #[test]
    fn test_no_rule_matches_leaves_path_alone() {
        assert_eq!(
            rasterize_candidate("assets/icons/ic_launcher.xml", "xxxhdpi"),
            None
        );
        assert_eq!(matching_rule_index("res/raw/ic_launcher.xml"), None);
    }

    #[test]
    fn test_resolve_by_density() {
        let icons = icons(&[(160, "res/drawable-mdpi/ic.png")]);
        let mut archive = MemorySource::new(&[("res/drawable-mdpi/ic.png", b"mdpi-bytes")]);
        let resolver = IconResolver::new(&icons, "res/drawable-mdpi/ic.png");

        assert_eq!(
            resolver.resolve(&mut archive, Some(160), false),
            Some(b"mdpi-bytes".to_vec())
        );
        // Unknown density has no source path at all.
        assert_eq!(resolver.resolve(&mut archive, Some(480), false), None);
    }

    #[test]
    fn test_resolve_default_icon() {
        let icons = icons(&[]);
        let mut archive = MemorySource::new(&[("res/drawable/ic.png", b"default")]);
        let resolver = IconResolver::new(&icons, "res/drawable/ic.png");

        assert_eq!(
            resolver.resolve(&mut archive, None, false),
            Some(b"default".to_vec())
        );
    }

    #[test]
    fn test_resolve_empty_path_is_absent() {
        let icons = icons(&[]);
        let mut archive = MemorySource::new(&[]);
        let resolver = IconResolver::new(&icons, "");

        assert_eq!(resolver.resolve(&mut archive, None, true), None);
    }

    #[test]
    fn test_resolve_raster_rewrites_vector() {
        let icons = icons(&[(640, "res/mipmap-anydpi-v26/ic.xml")]);
        let mut archive = MemorySource::new(&[
            ("res/mipmap-anydpi-v26/ic.xml", b"<adaptive-icon/>"),
            ("res/mipmap-xxxhdpi-v4/ic.png", b"raster"),
        ]);
        let resolver = IconResolver::new(&icons, "res/mipmap-anydpi-v26/ic.xml");

        assert_eq!(
            resolver.resolve(&mut archive, Some(640), true),
            Some(b"raster".to_vec())
        );
        // Without want_raster the vector entry itself comes back.
        assert_eq!(
            resolver.resolve(&mut archive, Some(640), false),
            Some(b"<adaptive-icon/>".to_vec())
        );
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let icons = icons(&[(320, "res/drawable-xhdpi/ic.png")]);
        let mut archive = MemorySource::new(&[("res/drawable-xhdpi/ic.png", b"xhdpi")]);
        let resolver = IconResolver::new(&icons, "res/drawable-xhdpi/ic.png");

        let first = resolver.resolve(&mut archive, Some(320), true);
        let second = resolver.resolve(&mut archive, Some(320), true);
        assert_eq!(first, second);
    }

    #[test]
    fn test_adaptive_icon_detected() {
        let mut archive = MemorySource::new(&[(
            "res/mipmap-anydpi-v26/ic_launcher.xml",
            b"<?xml version=\"1.0\"?><adaptive-icon></adaptive-icon>",
        )]);
        let result = detect_adaptive_icon(
            &mut archive,
            "res/mipmap-anydpi-v26/ic_launcher.xml",
            Some(26),
        );
        assert!(result.is_adaptive);
        // min sdk already at the threshold: no fallback needed or reported.
        assert!(!result.has_backward_compatible_fallback);
    }

    #[test]
    fn test_adaptive_icon_backward_compatible_fallback() {
        let mut archive = MemorySource::new(&[
            (
                "res/mipmap-anydpi-v26/ic_launcher.xml",
                b"<adaptive-icon/>".as_slice(),
            ),
            ("res/mipmap-xxxhdpi-v4/ic_launcher.png", b"png".as_slice()),
        ]);
        let result = detect_adaptive_icon(
            &mut archive,
            "res/mipmap-anydpi-v26/ic_launcher.xml",
            Some(21),
        );
        assert!(result.is_adaptive);
        assert!(result.has_backward_compatible_fallback);
    }

    #[test]
    fn test_adaptive_icon_fallback_missing() {
        let mut archive = MemorySource::new(&[(
            "res/mipmap-anydpi-v26/ic_launcher.xml",
            b"<adaptive-icon/>",
        )]);
        let result = detect_adaptive_icon(
            &mut archive,
            "res/mipmap-anydpi-v26/ic_launcher.xml",
            Some(21),
        );
        assert!(result.is_adaptive);
        assert!(!result.has_backward_compatible_fallback);
    }

    #[test]
    fn test_non_adaptive_path_short_circuits() {
        let mut archive = MemorySource::new(&[]);
        let result =
            detect_adaptive_icon(&mut archive, "res/drawable-mdpi/ic.png", Some(21));
        assert!(!result.is_adaptive);
        assert!(!result.has_backward_compatible_fallback);
    }

    #[test]
    fn test_missing_entry_degrades_to_non_adaptive() {
        let mut archive = MemorySource::new(&[]);
        let result = detect_adaptive_icon(
            &mut archive,
            "res/mipmap-anydpi-v26/ic_launcher.xml",
            Some(21),
        );
        assert!(!result.is_adaptive);
    }

    #[test]
    fn test_marker_absent_is_not_adaptive() {
        let mut archive = MemorySource::new(&[(
            "res/mipmap-anydpi-v26/ic_launcher.xml",
            b"<vector></vector>",
        )]);
        let result = detect_adaptive_icon(
            &mut archive,
            "res/mipmap-anydpi-v26/ic_launcher.xml",
            Some(21),
        );
        assert!(!result.is_adaptive);
    }
}
