//! Replay command - Feed captured context messages through the relay.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use tracing::warn;

use playmap_core::PlaymapConfig;
use playmap_observe::{RelayOutcome, TelemetryRelay};

use super::{RunManifest, print_json};
use crate::OutputFormat;

/// Arguments for the replay command.
#[derive(Args)]
pub struct ReplayArgs {
    /// Run manifest written by `assemble --manifest`
    #[arg(short, long)]
    pub manifest: PathBuf,

    /// Captured messages, one JSON value per line
    #[arg(required = true)]
    pub messages: PathBuf,

    /// Keep messages tagged with another run
    #[arg(long)]
    pub keep_stale: bool,
}

/// Execute the replay command.
pub fn execute(args: ReplayArgs, config: &PlaymapConfig, format: OutputFormat) -> Result<()> {
    let text = std::fs::read_to_string(&args.manifest)
        .with_context(|| format!("Failed to read manifest: {}", args.manifest.display()))?;
    let manifest: RunManifest = serde_json::from_str(&text)
        .with_context(|| format!("Invalid manifest: {}", args.manifest.display()))?;

    let mut relay_config = config.relay.clone();
    if args.keep_stale {
        relay_config = relay_config.with_discard_stale(false);
    }
    let relay = TelemetryRelay::new(relay_config);
    relay.begin_run(manifest.run, Arc::new(manifest.registry));

    let file = File::open(&args.messages)
        .with_context(|| format!("Failed to open {}", args.messages.display()))?;

    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let value: serde_json::Value = match serde_json::from_str(&line) {
            Ok(value) => value,
            Err(e) => {
                warn!(line = index + 1, error = %e, "Skipping line that is not JSON");
                continue;
            }
        };
        if let RelayOutcome::Rejected(e) = relay.handle(&value) {
            warn!(line = index + 1, error = %e, "Rejected message");
        }
    }

    let report = relay.report();
    if !print_json(&report, format)? {
        print!("{}", report.to_text());
    }

    Ok(())
}
