// Copyright (c) 2025 - Cowboy AI, Inc.
//! Cloud Assembly Synthesizer
//!
//! Builds the hello deployment and writes its cloud assembly for the
//! external provisioning tool.
//!
//! Run with: cargo run --bin cim-synth
//!
//! Environment:
//! 1. CDK_OUTDIR - output directory (default: cdk.out)
//! 2. CIM_APP_ROOT - directory holding data/user-data.sh and lambda/ (default: .)
//! 3. CDK_DEFAULT_ACCOUNT / CDK_DEFAULT_REGION - optional target environment

use anyhow::{Context, Result};
use cim_deployment::{deployment::define_app, SynthConfig};
use tracing::info;

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("🚀 Starting synthesis");

    // Load configuration
    let config = SynthConfig::from_env();
    info!("📋 Configuration loaded:");
    info!("  - App root: {}", config.app_root.display());
    info!("  - Output: {}", config.out_dir.display());
    info!("  - Environment: {}", config.environment);

    let app = define_app(&config).context("Failed to define deployment")?;
    info!("✅ Defined {} units", app.units().len());

    let assembly = app.synthesize().context("Failed to synthesize deployment")?;

    for unit in &assembly.manifest.units {
        for reference in &unit.unresolved_references {
            info!(
                "⚠️  {} expects {} {} ({}) to exist at deploy time",
                unit.id, reference.purpose, reference.name, reference.variable
            );
        }
    }

    let written = assembly
        .write_to(&config.out_dir)
        .with_context(|| format!("Failed to write assembly to {}", config.out_dir.display()))?;

    info!(
        "✅ Wrote {} files, deploy order: {}",
        written.len(),
        assembly
            .manifest
            .order()
            .iter()
            .map(|id| id.as_str())
            .collect::<Vec<_>>()
            .join(" -> ")
    );

    Ok(())
}
