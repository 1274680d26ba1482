//! Source files and the project file table.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::media::MediaType;

/// Stable key of a source file.
///
/// Ids are chosen by the caller and are independent of the file name, so a
/// rename does not re-key the file.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(String);

impl FileId {
    /// Create a file id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FileId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for FileId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// One authored file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Stable key.
    pub id: FileId,
    /// Logical file name used for resolution and attribution.
    pub name: String,
    /// File content.
    pub content: String,
}

impl SourceFile {
    /// Create a source file.
    pub fn new(id: impl Into<FileId>, name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            content: content.into(),
        }
    }

    /// Media type inferred from the file name.
    pub fn media_type(&self) -> MediaType {
        MediaType::infer(&self.name)
    }
}

/// Persisted shape of one file: `{ "name": ..., "value": ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// File name.
    pub name: String,
    /// File content.
    pub value: String,
}

/// The project's files, keyed and ordered by [`FileId`].
///
/// Serializes as `mapping<fileId, {name, value}>`, the shape used both for
/// persisted state and inside project archives.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<FileId, FileRecord>", into = "BTreeMap<FileId, FileRecord>")]
pub struct FileTable {
    files: BTreeMap<FileId, SourceFile>,
}

impl FileTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a file. Returns the previous file under that id.
    pub fn insert(&mut self, file: SourceFile) -> Option<SourceFile> {
        self.files.insert(file.id.clone(), file)
    }

    /// Create a file under a new id.
    pub fn create(
        &mut self,
        id: impl Into<FileId>,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> &SourceFile {
        let file = SourceFile::new(id, name, content);
        let id = file.id.clone();
        self.files.insert(id.clone(), file);
        &self.files[&id]
    }

    /// Replace the content of a file. Returns false if the id is unknown.
    pub fn edit(&mut self, id: &FileId, content: impl Into<String>) -> bool {
        match self.files.get_mut(id) {
            Some(file) => {
                file.content = content.into();
                true
            }
            None => false,
        }
    }

    /// Rename a file. Returns false if the id is unknown.
    pub fn rename(&mut self, id: &FileId, name: impl Into<String>) -> bool {
        match self.files.get_mut(id) {
            Some(file) => {
                file.name = name.into();
                true
            }
            None => false,
        }
    }

    /// Remove a file.
    pub fn remove(&mut self, id: &FileId) -> Option<SourceFile> {
        self.files.remove(id)
    }

    /// Look up a file by id.
    pub fn get(&self, id: &FileId) -> Option<&SourceFile> {
        self.files.get(id)
    }

    /// Look up the last file, in id order, carrying the given name.
    pub fn find_by_name(&self, name: &str) -> Option<&SourceFile> {
        self.files.values().rev().find(|f| f.name == name)
    }

    /// Iterate over files in id order.
    pub fn iter(&self) -> impl Iterator<Item = &SourceFile> + '_ {
        self.files.values()
    }

    /// `(name, content)` pairs in id order.
    ///
    /// Duplicate names are all yielded; consumers that build a name map
    /// let the later one win.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.files
            .values()
            .map(|f| (f.name.as_str(), f.content.as_str()))
    }

    /// Name → content mapping, later files winning on duplicate names.
    pub fn by_name(&self) -> BTreeMap<String, String> {
        self.entries()
            .map(|(name, content)| (name.to_string(), content.to_string()))
            .collect()
    }

    /// Number of files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl From<BTreeMap<FileId, FileRecord>> for FileTable {
    fn from(records: BTreeMap<FileId, FileRecord>) -> Self {
        let files = records
            .into_iter()
            .map(|(id, record)| {
                let file = SourceFile {
                    id: id.clone(),
                    name: record.name,
                    content: record.value,
                };
                (id, file)
            })
            .collect();
        Self { files }
    }
}

impl From<FileTable> for BTreeMap<FileId, FileRecord> {
    fn from(table: FileTable) -> Self {
        table
            .files
            .into_iter()
            .map(|(id, file)| {
                let record = FileRecord {
                    name: file.name,
                    value: file.content,
                };
                (id, record)
            })
            .collect()
    }
}

impl FromIterator<SourceFile> for FileTable {
    fn from_iter<I: IntoIterator<Item = SourceFile>>(iter: I) -> Self {
        let mut table = Self::new();
        for file in iter {
            table.insert(file);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FileTable {
        let mut table = FileTable::new();
        table.create("a", "index.html", "<html></html>");
        table.create("b", "main.js", "console.log(1)");
        table
    }

    #[test]
    fn test_edit_and_rename_keep_id() {
        let mut table = sample();
        let id = FileId::new("b");

        assert!(table.edit(&id, "console.log(2)"));
        assert!(table.rename(&id, "app.js"));

        let file = table.get(&id).unwrap();
        assert_eq!(file.name, "app.js");
        assert_eq!(file.content, "console.log(2)");
        assert!(!table.edit(&FileId::new("missing"), ""));
    }

    #[test]
    fn test_remove() {
        let mut table = sample();
        assert!(table.remove(&FileId::new("a")).is_some());
        assert_eq!(table.len(), 1);
        assert!(table.find_by_name("index.html").is_none());
    }

    #[test]
    fn test_by_name_last_write_wins() {
        let mut table = sample();
        table.create("c", "main.js", "console.log('later')");

        let map = table.by_name();
        assert_eq!(map.len(), 2);
        assert_eq!(map["main.js"], "console.log('later')");
        assert_eq!(table.find_by_name("main.js").unwrap().id.as_str(), "c");
    }

    #[test]
    fn test_persisted_shape() {
        let table = sample();
        let json = serde_json::to_value(&table).unwrap();

        assert_eq!(json["a"]["name"], "index.html");
        assert_eq!(json["b"]["value"], "console.log(1)");

        let back: FileTable = serde_json::from_value(json).unwrap();
        assert_eq!(back, table);
    }
}
