//! Single-file project archives.
//!
//! An archive is a JSON document:
//!
//! ```json
//! { "files": { "<fileId>": { "name": "...", "value": "..." } },
//!   "playmap": { "version": 1 } }
//! ```
//!
//! Import only accepts documents whose `playmap.version` is present and
//! truthy.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{ArchiveError, ArchiveResult};
use crate::file::FileTable;

/// Archive format version written on export.
pub const ARCHIVE_VERSION: u64 = 1;

/// File extension of exported archives.
pub const ARCHIVE_EXTENSION: &str = "playmap";

/// Marker section of an archive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveMeta {
    /// Format version.
    pub version: Value,
}

/// A project archive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectArchive {
    /// The project's files.
    pub files: FileTable,
    /// Format marker.
    pub playmap: ArchiveMeta,
}

impl ProjectArchive {
    /// Wrap a file table in an archive of the current version.
    pub fn new(files: FileTable) -> Self {
        Self {
            files,
            playmap: ArchiveMeta {
                version: Value::from(ARCHIVE_VERSION),
            },
        }
    }

    /// Serialize to pretty JSON.
    pub fn to_json_pretty(&self) -> ArchiveResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse and validate an archive.
    ///
    /// The marker is checked before the file table is decoded, so a
    /// document without it is rejected as [`ArchiveError::MissingVersion`]
    /// whatever its other content.
    pub fn from_json(text: &str) -> ArchiveResult<Self> {
        let document: Value = serde_json::from_str(text)?;

        let version = document.get("playmap").and_then(|meta| meta.get("version"));
        if !version.is_some_and(is_truthy) {
            warn!("Rejected archive without a playmap version marker");
            return Err(ArchiveError::MissingVersion);
        }

        let archive: Self = serde_json::from_value(document)?;
        debug!(files = archive.files.len(), "Parsed project archive");
        Ok(archive)
    }
}

/// Export a file table as archive text.
pub fn export(files: &FileTable) -> ArchiveResult<String> {
    ProjectArchive::new(files.clone()).to_json_pretty()
}

/// Import archive text into a file table.
pub fn import(text: &str) -> ArchiveResult<FileTable> {
    ProjectArchive::from_json(text).map(|archive| archive.files)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FileTable {
        let mut files = FileTable::new();
        files.create("1", "index.html", "<!doctype html><html><head></head></html>");
        files.create("2", "main.js", "import './util.js';");
        files.create("3", "util.js", "export const x = 1;");
        files
    }

    #[test]
    fn test_export_then_import_round_trip() {
        let files = sample();
        let text = export(&files).unwrap();
        let imported = import(&text).unwrap();

        assert_eq!(imported.by_name(), files.by_name());
        assert_eq!(imported, files);
    }

    #[test]
    fn test_export_shape() {
        let text = export(&sample()).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();

        assert_eq!(value["playmap"]["version"], 1);
        assert_eq!(value["files"]["2"]["name"], "main.js");
    }

    #[test]
    fn test_missing_version_rejected() {
        let text = r#"{ "files": { "1": { "name": "a.js", "value": "" } } }"#;
        assert!(matches!(import(text), Err(ArchiveError::MissingVersion)));

        let text = r#"{ "files": {}, "playmap": {} }"#;
        assert!(matches!(import(text), Err(ArchiveError::MissingVersion)));
    }

    #[test]
    fn test_falsy_version_rejected() {
        for version in ["0", "false", "null", "\"\""] {
            let text = format!(r#"{{ "files": {{}}, "playmap": {{ "version": {version} }} }}"#);
            assert!(
                matches!(import(&text), Err(ArchiveError::MissingVersion)),
                "version {version} should be rejected"
            );
        }
    }

    #[test]
    fn test_truthy_version_accepted() {
        let text = r#"{ "files": {}, "playmap": { "version": "2" } }"#;
        assert!(import(text).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(import("{ not json"), Err(ArchiveError::Malformed(_))));

        let text = r#"{ "files": [1, 2], "playmap": { "version": 1 } }"#;
        assert!(matches!(import(text), Err(ArchiveError::Malformed(_))));
    }
}
