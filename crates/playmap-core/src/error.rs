//! Core error types for Playmap.
//!
//! Errors are grouped by the concern that raises them: project archives,
//! persisted state, configuration and markup handling.

use thiserror::Error;

/// Top-level error type for Playmap core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Error while reading or writing a project archive.
    #[error("Archive error: {0}")]
    Archive(#[from] ArchiveError),

    /// Error from the persisted key-value store.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Error while loading configuration.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Error while scanning entry markup.
    #[error("Markup error: {0}")]
    Markup(#[from] MarkupError),
}

/// Errors raised when importing or exporting a project archive.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// The archive is not valid JSON or does not have the expected shape.
    #[error("Malformed archive: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The archive lacks a truthy `playmap.version` marker.
    #[error("Not a playmap archive: missing or falsy `playmap.version`")]
    MissingVersion,

    /// The archive was valid but could not be persisted.
    #[error("Failed to persist imported project: {0}")]
    Store(#[from] StoreError),
}

/// Errors from a key-value store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// IO error in a file-backed store.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The stored value could not be encoded.
    #[error("Encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    /// The key cannot be mapped onto the backend.
    #[error("Invalid key: '{0}'")]
    InvalidKey(String),
}

/// Errors while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading the configuration file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The TOML document could not be parsed.
    #[error("Invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    /// A value is syntactically valid but unusable.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Errors raised by the markup scanner.
#[derive(Debug, Error)]
pub enum MarkupError {
    /// A prelude script would terminate its own element early.
    #[error("Script body contains a closing script tag at byte {0}")]
    UnterminatedScript(usize),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Result type alias for archive operations.
pub type ArchiveResult<T> = std::result::Result<T, ArchiveError>;

/// Result type alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Result type alias for configuration loading.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for markup operations.
pub type MarkupResult<T> = std::result::Result<T, MarkupError>;
