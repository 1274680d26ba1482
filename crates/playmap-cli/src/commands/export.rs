//! Export command - Pack a project directory into an archive.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use playmap_core::{ARCHIVE_EXTENSION, archive};

use super::{print_json, read_dir};
use crate::OutputFormat;

/// Arguments for the export command.
#[derive(Args)]
pub struct ExportArgs {
    /// Project directory
    #[arg(required = true)]
    pub dir: PathBuf,

    /// Archive path (defaults to `<dir>.playmap`)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct ExportSummary {
    archive: String,
    files: usize,
    bytes: usize,
}

/// Execute the export command.
pub fn execute(args: ExportArgs, format: OutputFormat, quiet: bool) -> Result<()> {
    let files = read_dir(&args.dir)?;
    let text = archive::export(&files).context("Failed to encode archive")?;

    let output = args
        .output
        .unwrap_or_else(|| args.dir.with_extension(ARCHIVE_EXTENSION));
    fs::write(&output, &text)
        .with_context(|| format!("Failed to write archive: {}", output.display()))?;

    let summary = ExportSummary {
        archive: output.display().to_string(),
        files: files.len(),
        bytes: text.len(),
    };

    if !print_json(&summary, format)? && !quiet {
        println!(
            "Exported {} files to {} ({} bytes)",
            summary.files, summary.archive, summary.bytes
        );
    }

    Ok(())
}
