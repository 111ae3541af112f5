// src/commands.rs
//! Command handlers for the apkmeta CLI

use anyhow::{Result, bail};
use apkmeta::metadata::PackageMetadata;
use serde_json::json;
use std::fs;
use std::path::Path;
use tracing::info;

/// `apkmeta inspect`
pub fn cmd_inspect(apk: &str, json: bool) -> Result<()> {
    let metadata = load_metadata(apk)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&metadata)?);
        return Ok(());
    }

    println!("Package:       {}", metadata.package_name);
    println!(
        "Version:       {} ({})",
        metadata.version_name, metadata.version_code
    );
    println!(
        "SDK:           min {} / target {}",
        metadata.sdk_version, metadata.target_sdk_version
    );
    println!("Label:         {}", metadata.label);
    for (locale, label) in &metadata.labels {
        println!("Label [{}]:    {}", locale, label);
    }
    println!("Icon:          {}", metadata.icon);
    for density in metadata.available_densities() {
        println!("Icon [{}]:    {}", density, metadata.icons[&density]);
    }
    println!("Test only:     {}", metadata.test_only);
    let adaptive = metadata.adaptive_icon_result();
    println!("Adaptive icon: {}", adaptive.is_adaptive);
    if adaptive.is_adaptive {
        println!(
            "Raster fallback: {}",
            adaptive.has_backward_compatible_fallback
        );
    }
    Ok(())
}

/// `apkmeta icon`
pub fn cmd_icon(apk: &str, output: &str, density: Option<u32>, raster: bool) -> Result<()> {
    let metadata = load_metadata(apk)?;

    let Some(content) = metadata.icon_file(density, raster) else {
        bail!("No icon entry found for the requested density");
    };

    fs::write(output, &content)?;
    info!("Wrote {} bytes to {}", content.len(), output);
    Ok(())
}

/// `apkmeta signature`
pub fn cmd_signature(apk: &str, json: bool) -> Result<()> {
    let metadata = load_metadata(apk)?;
    let signing = metadata.signing_result();
    let reasons = metadata.uninstallable_reasons();

    if json {
        let report = json!({
            "signature": signing.signature,
            "verified": signing.verified,
            "signed": signing.is_signed(),
            "installable": reasons.is_empty(),
            "uninstallable_reasons": reasons,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    match &signing.signature {
        Some(fingerprint) => println!("Signature:   {}", fingerprint),
        None => println!("Signature:   (none)"),
    }
    println!("Verified:    {}", signing.verified);
    println!("Installable: {}", reasons.is_empty());
    for reason in &reasons {
        println!("  - {}", reason);
    }
    Ok(())
}

fn load_metadata(apk: &str) -> Result<PackageMetadata> {
    info!("Analyzing {}", apk);
    match apkmeta::analyze(Path::new(apk))? {
        Some(metadata) => Ok(metadata),
        None => bail!("Could not analyze {}: file missing or badging dump failed", apk),
    }
}
