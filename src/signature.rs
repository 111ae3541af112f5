// src/signature.rs

//! Signing-certificate fingerprint extraction
//!
//! The fingerprint comes from external tooling, tried in a fixed order:
//! apksigner's verification output first, then the signing-block certificate
//! decoded through openssl, then keytool as the older-toolchain fallback.
//! Every failure degrades to "no signature"; nothing here raises.

use crate::archive::ArchiveSource;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeSet;
use std::io::Write;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::time::Duration;
use tracing::{debug, warn};
use wait_timeout::ChildExt;

/// Maximal hex runs: colon-separated pairs or a bare hex string. Candidates
/// are length-checked afterwards so SHA-256 output never passes as SHA-1.
static HEX_RUN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:[0-9a-f]{2}(?::[0-9a-f]{2})+|[0-9a-f]+)\b").unwrap()
});

/// Outcome of a signing-fingerprint extraction.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SigningResult {
    /// SHA-1 certificate fingerprint, 40 lowercase hex characters.
    pub signature: Option<String>,
    /// True only when the primary verification strategy itself succeeded.
    pub verified: bool,
}

impl SigningResult {
    pub fn is_signed(&self) -> bool {
        self.signature.is_some()
    }
}

/// Raw text and success flag from one verification strategy.
#[derive(Debug, Clone, Default)]
pub struct StrategyOutcome {
    pub output: String,
    pub success: bool,
}

impl StrategyOutcome {
    pub fn failed() -> Self {
        Self::default()
    }

    fn usable(&self) -> bool {
        self.success && !self.output.trim().is_empty()
    }
}

/// The external verification capability, one method per strategy.
pub trait Verifier {
    /// Strategy 1: verify the archive and report the first signer's
    /// certificate record.
    fn verify_first_signer(&self, apk: &Path) -> StrategyOutcome;

    /// Strategy 2: decode a DER signing-block certificate through a generic
    /// crypto-to-text pipeline and print its fingerprint.
    fn print_cert_pipeline(&self, der: &[u8]) -> StrategyOutcome;

    /// Strategy 3: print the certificate with the legacy toolchain.
    fn print_cert_legacy(&self, der: &[u8]) -> StrategyOutcome;
}

/// Extracts the SHA-1 fingerprint using an injected [`Verifier`].
pub struct SignatureExtractor<'a> {
    verifier: &'a dyn Verifier,
}

impl<'a> SignatureExtractor<'a> {
    pub fn new(verifier: &'a dyn Verifier) -> Self {
        Self { verifier }
    }

    /// Run the strategies in order; the first usable output supplies the
    /// fingerprint, `verified` reflects only strategy 1.
    pub fn extract(
        &self,
        apk: &Path,
        archive: Option<&mut dyn ArchiveSource>,
    ) -> SigningResult {
        let first = self.verifier.verify_first_signer(apk);
        let verified = first.success;

        let mut text = None;
        if first.usable() {
            // apksigner reports several digests per signer; only the SHA-1
            // lines are fingerprint candidates.
            let sha1_lines: String = first
                .output
                .lines()
                .filter(|line| line.contains("SHA-1"))
                .collect::<Vec<_>>()
                .join("\n");
            if !sha1_lines.trim().is_empty() {
                text = Some(sha1_lines);
            }
        }

        if text.is_none() {
            if let Some(archive) = archive {
                if let Some(der) = signing_block(archive) {
                    let pipeline = self.verifier.print_cert_pipeline(&der);
                    if pipeline.usable() {
                        text = Some(pipeline.output);
                    } else {
                        let legacy = self.verifier.print_cert_legacy(&der);
                        if legacy.usable() {
                            text = Some(legacy.output);
                        }
                    }
                }
            }
        }

        let signature = text.as_deref().and_then(scan_fingerprint);
        SigningResult {
            signature,
            verified,
        }
    }
}

/// First RSA/DSA signing-block entry under META-INF, by sorted entry name.
fn signing_block(archive: &mut dyn ArchiveSource) -> Option<Vec<u8>> {
    let mut candidates: Vec<String> = archive
        .entry_names()
        .into_iter()
        .filter(|name| {
            name.starts_with("META-INF/") && (name.ends_with(".RSA") || name.ends_with(".DSA"))
        })
        .collect();
    candidates.sort();

    for name in candidates {
        match archive.read_entry(&name) {
            Ok(Some(content)) => return Some(content),
            Ok(None) => {}
            Err(e) => debug!("Failed to read signing block {}: {}", name, e),
        }
    }
    None
}

/// Scan tool output for a 20-byte hex fingerprint.
///
/// Exactly one distinct candidate is required; zero or several distinct runs
/// yield `None`. The result is colon-stripped and lowercased.
pub fn scan_fingerprint(text: &str) -> Option<String> {
    let mut candidates = BTreeSet::new();
    for m in HEX_RUN_RE.find_iter(text) {
        let run = m.as_str();
        let normalized = if run.contains(':') {
            let pairs: Vec<&str> = run.split(':').collect();
            if pairs.len() != 20 || pairs.iter().any(|p| p.len() != 2) {
                continue;
            }
            run.replace(':', "").to_lowercase()
        } else {
            if run.len() != 40 {
                continue;
            }
            run.to_lowercase()
        };
        candidates.insert(normalized);
    }

    if candidates.len() == 1 {
        candidates.into_iter().next()
    } else {
        None
    }
}

/// [`Verifier`] backed by the platform's apksigner/openssl/keytool binaries.
pub struct ToolVerifier {
    timeout: Duration,
}

impl Default for ToolVerifier {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
        }
    }
}

impl ToolVerifier {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    fn run(&self, mut command: Command, stdin_data: Option<&[u8]>) -> StrategyOutcome {
        command
            .stdin(if stdin_data.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::null());

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                debug!("Failed to spawn {:?}: {}", command.get_program(), e);
                return StrategyOutcome::failed();
            }
        };

        if let (Some(data), Some(mut stdin)) = (stdin_data, child.stdin.take()) {
            if let Err(e) = stdin.write_all(data) {
                debug!("Failed to feed {:?}: {}", command.get_program(), e);
            }
            // stdin drops here so the tool sees EOF.
        }

        match child.wait_timeout(self.timeout) {
            Ok(Some(status)) => StrategyOutcome {
                output: read_stdout(&mut child),
                success: status.success(),
            },
            Ok(None) => {
                warn!("{:?} timed out after {:?}", command.get_program(), self.timeout);
                let _ = child.kill();
                let _ = child.wait();
                StrategyOutcome::failed()
            }
            Err(e) => {
                debug!("Failed to wait for {:?}: {}", command.get_program(), e);
                let _ = child.kill();
                let _ = child.wait();
                StrategyOutcome::failed()
            }
        }
    }
}

fn read_stdout(child: &mut Child) -> String {
    use std::io::Read;
    let mut output = String::new();
    if let Some(mut stdout) = child.stdout.take() {
        let _ = stdout.read_to_string(&mut output);
    }
    output
}

impl Verifier for ToolVerifier {
    fn verify_first_signer(&self, apk: &Path) -> StrategyOutcome {
        let mut command = Command::new("apksigner");
        command
            .arg("verify")
            .arg("--print-certs")
            .arg("--max-signers-to-show")
            .arg("1")
            .arg(apk);
        self.run(command, None)
    }

    fn print_cert_pipeline(&self, der: &[u8]) -> StrategyOutcome {
        // pkcs7 DER -> PEM certificate chain.
        let mut pkcs7 = Command::new("openssl");
        pkcs7.args(["pkcs7", "-inform", "DER", "-print_certs"]);
        let pem = self.run(pkcs7, Some(der));
        if !pem.usable() {
            return StrategyOutcome::failed();
        }

        // PEM -> SHA-1 fingerprint line.
        let mut x509 = Command::new("openssl");
        x509.args(["x509", "-noout", "-fingerprint", "-sha1"]);
        self.run(x509, Some(pem.output.as_bytes()))
    }

    fn print_cert_legacy(&self, der: &[u8]) -> StrategyOutcome {
        // keytool only reads from a file; stage the block in a temp file
        // that is removed on drop on every exit path.
        let mut staged = match tempfile::NamedTempFile::new() {
            Ok(file) => file,
            Err(e) => {
                debug!("Failed to stage signing block: {}", e);
                return StrategyOutcome::failed();
            }
        };
        if let Err(e) = staged.write_all(der) {
            debug!("Failed to stage signing block: {}", e);
            return StrategyOutcome::failed();
        }

        let mut command = Command::new("keytool");
        command.arg("-printcert").arg("-file").arg(staged.path());
        self.run(command, None)
    }
}
