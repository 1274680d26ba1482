//! CLI command implementations.

pub mod assemble;
pub mod export;
pub mod import;
pub mod inspect;
pub mod replay;

use std::fs;
use std::path::{Component, Path};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use playmap_core::{FileTable, PlaymapConfig, RunId, archive};
use playmap_resource::ReverseRegistry;

use crate::OutputFormat;

/// What `replay` needs to attribute messages of one assembled run.
#[derive(Debug, Serialize, Deserialize)]
pub struct RunManifest {
    /// The run the document was assembled for.
    pub run: RunId,
    /// Locator to file name.
    pub registry: ReverseRegistry,
}

/// Load the configuration file, or defaults when none is given.
pub fn load_config(path: Option<&Path>) -> Result<PlaymapConfig> {
    match path {
        Some(path) => PlaymapConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display())),
        None => Ok(PlaymapConfig::default()),
    }
}

/// Load a project from a directory or an archive file.
pub fn load_project(path: &Path) -> Result<FileTable> {
    if path.is_dir() {
        return read_dir(path);
    }

    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read archive: {}", path.display()))?;
    archive::import(&text).with_context(|| format!("Invalid archive: {}", path.display()))
}

/// Read every text file below `root`. Names are root-relative with `/`
/// separators and double as file ids.
pub fn read_dir(root: &Path) -> Result<FileTable> {
    let mut paths = Vec::new();
    collect(root, root, &mut paths)?;
    paths.sort();

    let mut files = FileTable::new();
    for name in paths {
        let path = root.join(&name);
        match fs::read_to_string(&path) {
            Ok(content) => {
                files.create(name.clone(), name, content);
            }
            Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                warn!(path = %path.display(), "Skipping non-UTF-8 file");
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()));
            }
        }
    }

    debug!(root = %root.display(), files = files.len(), "Read project directory");
    Ok(files)
}

fn collect(root: &Path, dir: &Path, out: &mut Vec<String>) -> Result<()> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("Failed to list {}", dir.display()))?;

    for entry in entries {
        let entry = entry?;
        let name = entry.file_name();
        if name.to_string_lossy().starts_with('.') {
            continue;
        }

        let path = entry.path();
        if entry.file_type()?.is_dir() {
            collect(root, &path, out)?;
        } else if let Ok(relative) = path.strip_prefix(root) {
            let parts: Vec<_> = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();
            out.push(parts.join("/"));
        }
    }

    Ok(())
}

/// Write a file table below `root`, creating directories as needed.
///
/// Names that would escape `root` are refused before anything is written.
pub fn write_dir(root: &Path, files: &FileTable) -> Result<usize> {
    for file in files.iter() {
        let escapes = Path::new(&file.name)
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if file.name.is_empty() || escapes {
            bail!("Refusing to write file outside the output directory: '{}'", file.name);
        }
    }

    let mut written = 0;
    for file in files.iter() {
        let path = root.join(&file.name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&path, &file.content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        written += 1;
    }

    Ok(written)
}

/// Print a serializable result in one of the JSON formats.
///
/// Returns `false` for [`OutputFormat::Human`], leaving the caller to print.
pub fn print_json<T: Serialize>(value: &T, format: OutputFormat) -> Result<bool> {
    match format {
        OutputFormat::Human => Ok(false),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(value)?);
            Ok(true)
        }
        OutputFormat::JsonCompact => {
            println!("{}", serde_json::to_string(value)?);
            Ok(true)
        }
    }
}
