//! Import command - Unpack an archive into a directory.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use playmap_core::{FileStore, PlaymapConfig, ProjectStore, archive};

use super::{print_json, write_dir};
use crate::OutputFormat;

/// Arguments for the import command.
#[derive(Args)]
pub struct ImportArgs {
    /// Archive file
    #[arg(required = true)]
    pub archive: PathBuf,

    /// Directory to unpack into
    #[arg(short, long)]
    pub output: PathBuf,

    /// Also persist the project into this store directory
    #[arg(long)]
    pub store: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct ImportSummary {
    output: String,
    files: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    store: Option<String>,
}

/// Execute the import command.
///
/// A malformed archive is rejected before anything is written.
pub fn execute(
    args: ImportArgs,
    config: &PlaymapConfig,
    format: OutputFormat,
    quiet: bool,
) -> Result<()> {
    let text = fs::read_to_string(&args.archive)
        .with_context(|| format!("Failed to read archive: {}", args.archive.display()))?;

    let files = archive::import(&text)
        .with_context(|| format!("Invalid archive: {}", args.archive.display()))?;

    write_dir(&args.output, &files)?;

    if let Some(root) = &args.store {
        ProjectStore::new(FileStore::new(root), &config.project.storage_key)
            .save(&files)
            .with_context(|| format!("Failed to persist project to {}", root.display()))?;
    }

    let summary = ImportSummary {
        output: args.output.display().to_string(),
        files: files.by_name().into_keys().collect(),
        store: args.store.as_ref().map(|p| p.display().to_string()),
    };

    if !print_json(&summary, format)? && !quiet {
        println!("Imported {} files into {}", summary.files.len(), summary.output);
        for name in &summary.files {
            println!("  {}", name);
        }
        if let Some(store) = &summary.store {
            println!("Persisted to store: {}", store);
        }
    }

    Ok(())
}
