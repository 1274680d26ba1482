//! Capability errors.

use thiserror::Error;

use crate::capability::{CapabilityId, DenialReason};

/// Errors from granting capabilities and checking context actions.
#[derive(Debug, Error)]
pub enum CapabilityError {
    /// A granted capability refused the action.
    #[error("Permission denied: {reason}")]
    PermissionDenied {
        /// Which capability refused, and why.
        reason: DenialReason,
    },

    /// No granted capability covers the action.
    #[error("Action not granted: {action}")]
    NotGranted {
        /// The action type, e.g. `popup:open`.
        action: String,
    },

    /// The capability is already part of the set.
    #[error("Capability already granted: {0}")]
    AlreadyGranted(CapabilityId),

    /// The capability would render an unusable `sandbox` token.
    #[error("Invalid sandbox token '{token}' for capability {capability}")]
    InvalidToken {
        /// The offending capability.
        capability: CapabilityId,
        /// The token it produced.
        token: String,
    },
}

/// Result type for capability operations.
pub type CapabilityResult<T> = std::result::Result<T, CapabilityError>;
