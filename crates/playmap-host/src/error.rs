//! Host errors.

use thiserror::Error;

/// Errors from loading contexts and checking what they may do.
#[derive(Debug, Error)]
pub enum HostError {
    /// The context's grants refused the action.
    #[error("Context may not perform '{action}': {reason}")]
    PermissionDenied {
        /// Action type, e.g. `navigate:top`.
        action: String,
        /// Rendered denial.
        reason: String,
    },

    /// The action is outside every grant of the context.
    #[error("Action '{action}' is not granted to the context")]
    NotGranted {
        /// Action type.
        action: String,
    },

    /// Nothing is loaded.
    #[error("No execution context is loaded")]
    NoContext,
}

pub type HostResult<T> = std::result::Result<T, HostError>;
