// src/density.rs

//! Screen-density bucket mapping
//!
//! Android resources are selected by density bucket (ldpi..xxxhdpi). Lookup
//! is total: unknown or absent densities resolve to the highest bucket so an
//! icon of usable quality is always preferred over none.

/// Canonical density -> bucket table.
pub const DENSITY_BUCKETS: [(u32, &str); 6] = [
    (120, "ldpi"),
    (160, "mdpi"),
    (240, "hdpi"),
    (320, "xhdpi"),
    (480, "xxhdpi"),
    (640, "xxxhdpi"),
];

/// Bucket used for any density outside the table.
pub const DEFAULT_BUCKET: &str = "xxxhdpi";

/// Resolve a numeric density to its bucket name. Total: exact table matches
/// only, everything else (including absent input) maps to [`DEFAULT_BUCKET`].
pub fn bucket_for(density: Option<u32>) -> &'static str {
    density
        .and_then(|d| {
            DENSITY_BUCKETS
                .iter()
                .find(|(table, _)| *table == d)
                .map(|(_, bucket)| *bucket)
        })
        .unwrap_or(DEFAULT_BUCKET)
}

/// Reverse lookup: the numeric density of a bucket name, if it is canonical.
pub fn density_for(bucket: &str) -> Option<u32> {
    DENSITY_BUCKETS
        .iter()
        .find(|(_, name)| *name == bucket)
        .map(|(density, _)| *density)
}
