// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use apkmeta::signature::{StrategyOutcome, Verifier};
use apkmeta::{ArchiveSource, DumpSource, Result};
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Badging dump of a plain, fully-populated sample package.
pub const SAMPLE_DUMP: &str =
    "package: name='com.example.sample' versionCode='1' versionName='1.0'\n\
     sdkVersion:'7'\n\
     targetSdkVersion:'15'\n\
     application-label:'sample'\n\
     application-label-ja:'サンプル'\n\
     application-icon-160:'res/drawable-mdpi/ic_launcher.png'\n\
     application-icon-640:'res/drawable-xxxhdpi/ic_launcher.png'\n\
     application: label='sample' icon='res/drawable-mdpi/ic_launcher.png'\n";

/// Badging dump of a package using an adaptive launcher icon.
pub const ADAPTIVE_DUMP: &str =
    "package: name='com.example.adaptive' versionCode='3' versionName='3.1'\n\
     sdkVersion:'21'\n\
     targetSdkVersion:'33'\n\
     application-label:'adaptive'\n\
     application-icon-640:'res/mipmap-anydpi-v26/ic_launcher.xml'\n\
     application: label='adaptive' icon='res/mipmap-anydpi-v26/ic_launcher.xml'\n";

/// Write a ZIP with the given entries; keep the handle alive for the file
/// to exist.
pub fn fixture_apk(entries: &[(&str, &[u8])]) -> NamedTempFile {
    let file = NamedTempFile::new().unwrap();
    let mut writer = ZipWriter::new(file.reopen().unwrap());
    for (name, content) in entries {
        writer
            .start_file(name.to_string(), SimpleFileOptions::default())
            .unwrap();
        writer.write_all(content).unwrap();
    }
    writer.finish().unwrap();
    file
}

/// Dump source returning canned badging text.
pub struct CannedDump(pub String);

impl DumpSource for CannedDump {
    fn badging(&self, _apk: &Path) -> Option<String> {
        Some(self.0.clone())
    }
}

/// Archive source over an in-memory entry map.
pub struct MemorySource(pub HashMap<String, Vec<u8>>);

impl MemorySource {
    pub fn new(entries: &[(&str, &[u8])]) -> Self {
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

/// Verifier with fixed per-strategy outcomes.
pub struct FakeVerifier {
    pub first: StrategyOutcome,
    pub pipeline: StrategyOutcome,
    pub legacy: StrategyOutcome,
}

impl FakeVerifier {
    pub fn all_failing() -> Self {
        Self {
            first: StrategyOutcome::failed(),
            pipeline: StrategyOutcome::failed(),
            legacy: StrategyOutcome::failed(),
        }
    }
}

impl Verifier for FakeVerifier {
    fn verify_first_signer(&self, _apk: &Path) -> StrategyOutcome {
        self.first.clone()
    }

    fn print_cert_pipeline(&self, _der: &[u8]) -> StrategyOutcome {
        self.pipeline.clone()
    }

    fn print_cert_legacy(&self, _der: &[u8]) -> StrategyOutcome {
        self.legacy.clone()
    }
}

pub fn outcome(output: &str) -> StrategyOutcome {
    StrategyOutcome {
        output: output.to_string(),
        success: true,
    }
}
