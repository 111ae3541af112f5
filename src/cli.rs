// src/cli.rs
//! CLI definitions for apkmeta
//!
//! This module contains all command-line interface definitions using clap.
//! The actual command implementations are in the `commands` module.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "apkmeta")]
#[command(author, version)]
#[command(about = "Inspect Android APK metadata, icons, and signing status", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show package metadata extracted from the badging dump
    Inspect {
        /// Path to the APK file
        apk: String,

        /// Emit machine-readable JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Resolve an icon out of the APK and write it to a file
    Icon {
        /// Path to the APK file
        apk: String,

        /// Output file for the icon bytes
        #[arg(short, long)]
        output: String,

        /// Density to resolve (defaults to the manifest's default icon)
        #[arg(short, long)]
        density: Option<u32>,

        /// Rewrite vector icon paths to their raster siblings
        #[arg(long)]
        raster: bool,
    },

    /// Show the signing fingerprint and install eligibility
    Signature {
        /// Path to the APK file
        apk: String,

        /// Emit machine-readable JSON instead of text
        #[arg(long)]
        json: bool,
    },
}
