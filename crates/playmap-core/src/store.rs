//! Persisted project state.
//!
//! The project is persisted as one key-value entry whose value is the JSON
//! file table. Backends implement [`KeyValueStore`]; [`ProjectStore`] layers
//! the load/save/import rules on top of any backend.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::archive;
use crate::error::{ArchiveResult, StoreError, StoreResult};
use crate::file::FileTable;
use crate::seed::seed_project;

/// Minimal string key-value storage.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Remove the value under `key`.
    fn remove(&self, key: &str) -> StoreResult<()>;
}

/// In-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.entries
            .write()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.entries.write().remove(key);
        Ok(())
    }
}

/// Store keeping one file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `root`. The directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding the entries.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> StoreResult<PathBuf> {
        if key.is_empty() {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        let file_name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        if file_name.chars().all(|c| c == '.') {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(format!("{file_name}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.root)?;
        std::fs::write(&path, value)?;
        debug!(path = %path.display(), bytes = value.len(), "Wrote store entry");
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// Project persistence on top of a key-value backend.
pub struct ProjectStore<S> {
    backend: S,
    key: String,
}

impl<S: KeyValueStore> ProjectStore<S> {
    /// Create a project store persisting under `key`.
    pub fn new(backend: S, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
        }
    }

    /// Access the backend.
    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Load the persisted project.
    ///
    /// A missing, unreadable or unparsable entry falls back to the seed
    /// project. The failure is logged and never returned.
    pub fn load(&self) -> FileTable {
        let text = match self.backend.get(&self.key) {
            Ok(Some(text)) => text,
            Ok(None) => {
                debug!(key = %self.key, "No persisted project, using seed");
                return seed_project();
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "Failed to read persisted project, using seed");
                return seed_project();
            }
        };

        match serde_json::from_str::<FileTable>(&text) {
            Ok(files) => {
                debug!(key = %self.key, files = files.len(), "Loaded persisted project");
                files
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "Persisted project is corrupt, using seed");
                seed_project()
            }
        }
    }

    /// Persist a file table.
    pub fn save(&self, files: &FileTable) -> StoreResult<()> {
        let text = serde_json::to_string(files)?;
        self.backend.set(&self.key, &text)
    }

    /// Import archive text, persisting it only if it is valid.
    ///
    /// The caller swaps in the returned table only on success. A rejected
    /// archive leaves the backend untouched; a failed write is returned so
    /// the working table and the persisted one never disagree.
    pub fn import_archive(&self, text: &str) -> ArchiveResult<FileTable> {
        let files = archive::import(text)?;
        if let Err(e) = self.save(&files) {
            warn!(key = %self.key, error = %e, "Imported archive could not be persisted");
            return Err(e.into());
        }
        info!(key = %self.key, files = files.len(), "Imported project archive");
        Ok(files)
    }

    /// Export the persisted project as archive text.
    pub fn export_archive(&self) -> ArchiveResult<String> {
        archive::export(&self.load())
    }
}
