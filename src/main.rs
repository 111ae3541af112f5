// src/main.rs

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect { apk, json } => commands::cmd_inspect(&apk, json),
        Commands::Icon {
            apk,
            output,
            density,
            raster,
        } => commands::cmd_icon(&apk, &output, density, raster),
        Commands::Signature { apk, json } => commands::cmd_signature(&apk, json),
    }
}
