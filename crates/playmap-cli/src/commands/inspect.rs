//! Inspect command - Describe the files of a project.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use playmap::Playmap;
use playmap_core::{MediaType, PlaymapConfig};

use super::{load_project, print_json};
use crate::OutputFormat;

/// Arguments for the inspect command.
#[derive(Args)]
pub struct InspectArgs {
    /// Project directory or `.playmap` archive
    #[arg(required = true)]
    pub project: PathBuf,

    /// Show files
    #[arg(long)]
    pub files: bool,

    /// Show import map specifiers
    #[arg(long)]
    pub imports: bool,

    /// Show all information
    #[arg(long, short)]
    pub all: bool,
}

/// Inspection result.
#[derive(Debug, Serialize)]
struct InspectionResult {
    path: String,
    entry_file: String,
    has_entry: bool,
    sandbox: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    files: Option<Vec<FileDisplay>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    imports: Option<Vec<ImportDisplay>>,
}

#[derive(Debug, Serialize)]
struct FileDisplay {
    name: String,
    media: MediaType,
    #[serde(skip_serializing_if = "Option::is_none")]
    mime: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    editor_mode: Option<&'static str>,
    bytes: usize,
}

#[derive(Debug, Serialize)]
struct ImportDisplay {
    specifier: String,
    file: String,
}

/// Execute the inspect command.
///
/// Nothing is minted: the import map is shown as specifier → file name,
/// since locators only exist for the duration of a run.
pub fn execute(args: InspectArgs, config: &PlaymapConfig, format: OutputFormat) -> Result<()> {
    let files = load_project(&args.project)?;

    let runtime = Playmap::builder()
        .with_config(config.clone())
        .build()
        .context("Failed to create runtime")?;
    let resolver = runtime.resolver();

    let show_all = args.all || (!args.files && !args.imports);
    let entry_file = config.project.entry_file.clone();

    let mut result = InspectionResult {
        path: args.project.display().to_string(),
        has_entry: files.find_by_name(&entry_file).is_some(),
        entry_file,
        sandbox: runtime.capabilities().sandbox_attribute(),
        files: None,
        imports: None,
    };

    if show_all || args.files {
        result.files = Some(
            files
                .iter()
                .map(|file| {
                    let media = file.media_type();
                    FileDisplay {
                        name: file.name.clone(),
                        media,
                        mime: media.mime(),
                        editor_mode: media.editor_mode(),
                        bytes: file.content.len(),
                    }
                })
                .collect(),
        );
    }

    if show_all || args.imports {
        let mut imports: Vec<ImportDisplay> = files
            .iter()
            .flat_map(|file| {
                [file.name.clone(), resolver.alias(&file.name)]
                    .into_iter()
                    .map(move |specifier| ImportDisplay {
                        specifier,
                        file: file.name.clone(),
                    })
            })
            .collect();
        imports.sort_by(|a, b| a.specifier.cmp(&b.specifier));
        result.imports = Some(imports);
    }

    if print_json(&result, format)? {
        return Ok(());
    }

    println!("Project: {}", result.path);
    let marker = if result.has_entry { "" } else { " (missing)" };
    println!("Entry: {}{}", result.entry_file, marker);
    println!("Sandbox: {}", result.sandbox);
    println!();

    if let Some(files) = &result.files {
        println!("Files ({}):", files.len());
        for file in files {
            match file.editor_mode {
                Some(mode) => println!(
                    "  {} [{}] {} bytes, editor: {}",
                    file.name,
                    file.media.as_str(),
                    file.bytes,
                    mode
                ),
                None => println!(
                    "  {} [{}] {} bytes",
                    file.name,
                    file.media.as_str(),
                    file.bytes
                ),
            }
        }
        println!();
    }

    if let Some(imports) = &result.imports {
        println!("Imports ({}):", imports.len());
        for import in imports {
            println!("  {} -> {}", import.specifier, import.file);
        }
    }

    Ok(())
}
