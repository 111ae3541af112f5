// src/install.rs

//! Install eligibility
//!
//! A pure verdict over already-computed facts; no I/O happens here.

use crate::signature::SigningResult;
use serde::Serialize;
use std::fmt;

/// Why a package cannot be installed on a production device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UninstallableReason {
    /// The primary verification strategy did not succeed.
    NotVerified,
    /// No signing certificate fingerprint could be extracted.
    Unsigned,
    /// The manifest marks the package test-only.
    TestOnly,
}

impl fmt::Display for UninstallableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotVerified => write!(f, "not verified"),
            Self::Unsigned => write!(f, "not signed"),
            Self::TestOnly => write!(f, "test only"),
        }
    }
}

/// Collect the reasons a package is not installable. Empty means it is.
pub fn uninstallable_reasons(
    signing: &SigningResult,
    test_only: bool,
) -> Vec<UninstallableReason> {
    let mut reasons = Vec::new();
    if !signing.verified {
        reasons.push(UninstallableReason::NotVerified);
    }
    if !signing.is_signed() {
        reasons.push(UninstallableReason::Unsigned);
    }
    if test_only {
        reasons.push(UninstallableReason::TestOnly);
    }
    reasons
}

/// Whether the package is installable.
pub fn is_installable(signing: &SigningResult, test_only: bool) -> bool {
    uninstallable_reasons(signing, test_only).is_empty()
}
