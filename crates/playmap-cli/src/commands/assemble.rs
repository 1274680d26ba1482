//! Assemble command - Build the runnable document of a project.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use tracing::info;

use playmap::prelude::*;

use super::{RunManifest, load_project, print_json};
use crate::OutputFormat;

/// Arguments for the assemble command.
#[derive(Args)]
pub struct AssembleArgs {
    /// Project directory or `.playmap` archive
    #[arg(required = true)]
    pub project: PathBuf,

    /// Write the document here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Wrap the document in a sandboxed iframe element
    #[arg(long)]
    pub frame: bool,

    /// Write the run manifest (run id and reverse registry) here
    #[arg(long)]
    pub manifest: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct AssembleSummary {
    run: RunId,
    files: usize,
    specifiers: usize,
    bytes: usize,
    sandbox: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    manifest: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    document: Option<String>,
}

/// Execute the assemble command.
pub fn execute(
    args: AssembleArgs,
    config: &PlaymapConfig,
    format: OutputFormat,
    quiet: bool,
) -> Result<()> {
    let files = load_project(&args.project)?;

    let runtime = Playmap::builder()
        .with_config(config.clone())
        .build()
        .context("Failed to create runtime")?;
    let session = runtime.session();
    let handle = session
        .run(&files)
        .with_context(|| format!("Failed to assemble {}", args.project.display()))?;

    let document = &handle.document;
    let text = if args.frame {
        handle.frame.to_iframe_markup()
    } else {
        document.document().to_string()
    };

    if let Some(path) = &args.manifest {
        let manifest = RunManifest {
            run: handle.run(),
            registry: document.registry().as_ref().clone(),
        };
        fs::write(path, serde_json::to_string_pretty(&manifest)?)
            .with_context(|| format!("Failed to write manifest: {}", path.display()))?;
    }

    if let Some(path) = &args.output {
        fs::write(path, &text)
            .with_context(|| format!("Failed to write document: {}", path.display()))?;
        info!(run = %handle.run(), path = %path.display(), "Wrote document");
    }

    let summary = AssembleSummary {
        run: handle.run(),
        files: files.len(),
        specifiers: document.import_map().len(),
        bytes: text.len(),
        sandbox: handle.frame.sandbox_attribute(),
        output: args.output.as_ref().map(|p| p.display().to_string()),
        manifest: args.manifest.as_ref().map(|p| p.display().to_string()),
        document: args.output.is_none().then(|| text.clone()),
    };

    if print_json(&summary, format)? {
        return Ok(());
    }

    match &args.output {
        None => println!("{}", text),
        Some(path) if !quiet => {
            println!("Assembled {} ({} files)", summary.run, summary.files);
            println!("  Specifiers: {}", summary.specifiers);
            println!("  Bytes: {}", summary.bytes);
            println!("  Sandbox: {}", summary.sandbox);
            println!("  Output: {}", path.display());
            if let Some(manifest) = &summary.manifest {
                println!("  Manifest: {}", manifest);
            }
        }
        Some(_) => {}
    }

    Ok(())
}
