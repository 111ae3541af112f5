// src/analyzer.rs

//! Top-level analysis entry points
//!
//! Runs the external badging dump tool against an APK and turns the output
//! into [`PackageMetadata`]. A missing file or a failing tool surfaces as
//! `None`; the only error is a duplicate disallow-listed manifest tag.

use crate::dump;
use crate::error::Result;
use crate::metadata::PackageMetadata;
use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Duration;
use tracing::{debug, warn};
use wait_timeout::ChildExt;

/// The external inspection-tool capability producing badging dump text.
pub trait DumpSource {
    /// Badging dump text for the archive, or `None` when the tool failed.
    fn badging(&self, apk: &Path) -> Option<String>;
}

/// [`DumpSource`] backed by the platform aapt/aapt2 binaries.
pub struct AaptDump {
    timeout: Duration,
}

impl Default for AaptDump {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
        }
    }
}

impl AaptDump {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    fn run_tool(&self, tool: &str, apk: &Path) -> Option<String> {
        let mut child = Command::new(tool)
            .arg("dump")
            .arg("badging")
            .arg(apk)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| debug!("Failed to run {}: {}", tool, e))
            .ok()?;

        match child.wait_timeout(self.timeout) {
            Ok(Some(status)) if status.success() => {
                let mut output = String::new();
                if let Some(mut stdout) = child.stdout.take() {
                    let _ = stdout.read_to_string(&mut output);
                }
                Some(output)
            }
            Ok(Some(status)) => {
                debug!("{} dump badging exited with {}", tool, status);
                None
            }
            Ok(None) => {
                warn!("{} dump badging timed out after {:?}", tool, self.timeout);
                let _ = child.kill();
                let _ = child.wait();
                None
            }
            Err(e) => {
                debug!("Failed to wait for {}: {}", tool, e);
                let _ = child.kill();
                let _ = child.wait();
                None
            }
        }
    }
}

impl DumpSource for AaptDump {
    fn badging(&self, apk: &Path) -> Option<String> {
        self.run_tool("aapt", apk)
            .or_else(|| self.run_tool("aapt2", apk))
    }
}

/// Analyze an APK with the platform toolchain.
pub fn analyze(apk: &Path) -> Result<Option<PackageMetadata>> {
    analyze_with(&AaptDump::default(), apk)
}

/// Analyze an APK with an injected dump source.
pub fn analyze_with(source: &dyn DumpSource, apk: &Path) -> Result<Option<PackageMetadata>> {
    if !apk.exists() {
        debug!("No such archive: {}", apk.display());
        return Ok(None);
    }

    let Some(text) = source.badging(apk) else {
        warn!("Badging dump failed for {}", apk.display());
        return Ok(None);
    };

    analyze_dump(&text, apk).map(Some)
}

/// Build metadata from already-captured badging dump text.
pub fn analyze_dump(text: &str, apk: &Path) -> Result<PackageMetadata> {
    let parsed = dump::parse(text)?;
    Ok(PackageMetadata::from_dump(&parsed, apk))
}
