//! Playmap Core - shared types for the sandbox playground pipeline
//!
//! This crate holds everything the pipeline stages agree on:
//!
//! - [`FileTable`] and [`SourceFile`]: the authored project
//! - [`MediaType`]: extension-based type inference
//! - [`RunId`]: identity of one assemble-and-observe cycle
//! - [`markup`]: start-tag scanner and pure prelude insertion
//! - [`archive`]: single-file project export and import
//! - [`ProjectStore`]: persisted project state with seed fallback
//! - [`PlaymapConfig`]: TOML-backed configuration
//!
//! # Quick Start
//!
//! ```ignore
//! use playmap_core::prelude::*;
//!
//! let store = ProjectStore::new(MemoryStore::new(), "playmap:files");
//! let mut files = store.load(); // seed project on first use
//!
//! files.create("n1", "util.js", "export const answer = 42;");
//! store.save(&files)?;
//!
//! let text = archive::export(&files)?;
//! assert_eq!(archive::import(&text)?.by_name(), files.by_name());
//! ```

pub mod archive;
pub mod config;
pub mod error;
pub mod file;
pub mod markup;
pub mod media;
pub mod run;
pub mod seed;
pub mod store;

// Re-export main types at crate root
pub use archive::{ARCHIVE_EXTENSION, ARCHIVE_VERSION, ArchiveMeta, ProjectArchive};
pub use config::{PlaymapConfig, ProjectConfig, RelayConfig, ResolverConfig};
pub use error::{
    ArchiveError, ArchiveResult, ConfigError, ConfigResult, CoreError, MarkupError, MarkupResult,
    Result, StoreError, StoreResult,
};
pub use file::{FileId, FileRecord, FileTable, SourceFile};
pub use media::MediaType;
pub use run::{RunCounter, RunId};
pub use seed::seed_project;
pub use store::{FileStore, KeyValueStore, MemoryStore, ProjectStore};

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```ignore
/// use playmap_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::archive;
    pub use crate::config::PlaymapConfig;
    pub use crate::error::{ArchiveError, CoreError, Result};
    pub use crate::file::{FileId, FileTable, SourceFile};
    pub use crate::media::MediaType;
    pub use crate::run::RunId;
    pub use crate::store::{FileStore, KeyValueStore, MemoryStore, ProjectStore};
}
