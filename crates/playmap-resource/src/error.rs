//! Error types for ephemeral resources.

use thiserror::Error;

/// Errors related to ephemeral resources.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// No live resource is registered under the locator.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// The locator does not belong to this store's scheme and origin.
    #[error("Foreign locator '{locator}', expected prefix '{expected}'")]
    ForeignLocator {
        /// The locator that was presented.
        locator: String,
        /// The prefix this store mints.
        expected: String,
    },

    /// The resource content is not valid UTF-8 text.
    #[error("Resource {0} is not UTF-8 text")]
    NotText(String),

    /// The import map could not be serialized.
    #[error("Import map serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for resource operations.
pub type ResourceResult<T> = std::result::Result<T, ResourceError>;
