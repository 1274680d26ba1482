//! Grants and the outcome of checking an action against them.
//!
//! A capability is one explicit grant to an execution context. Each grant
//! contributes a token to the context's `sandbox` attribute and answers
//! permission checks for the actions it covers.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::error::CapabilityError;

/// Name of a grant, e.g. `scripts` or `top_navigation`.
///
/// ```
/// use playmap_capability::{CapabilityId, standard_ids};
///
/// assert_eq!(CapabilityId::new("scripts"), standard_ids::SCRIPTS);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CapabilityId(Cow<'static, str>);

impl CapabilityId {
    pub fn new(id: impl Into<Cow<'static, str>>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CapabilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for CapabilityId {
    fn from(id: &'static str) -> Self {
        Self(Cow::Borrowed(id))
    }
}

/// What one grant, or a whole set, says about an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionResult {
    Allowed,
    Denied(DenialReason),
    /// The grant has no opinion on this action type.
    NotApplicable,
}

impl PermissionResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }

    pub fn is_denied(&self) -> bool {
        matches!(self, Self::Denied(_))
    }

    /// `Ok` only for `Allowed`. `action` names the action when no grant
    /// had an opinion.
    pub fn to_result(&self, action: &str) -> Result<(), CapabilityError> {
        match self {
            Self::Allowed => Ok(()),
            Self::Denied(reason) => Err(CapabilityError::PermissionDenied {
                reason: reason.clone(),
            }),
            Self::NotApplicable => Err(CapabilityError::NotGranted {
                action: action.to_string(),
            }),
        }
    }
}

/// Which grant refused which action, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DenialReason {
    pub capability: CapabilityId,
    pub action: String,
    pub message: String,
}

impl DenialReason {
    pub fn new(
        capability: CapabilityId,
        action: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            capability,
            action: action.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} - {}", self.capability, self.action, self.message)
    }
}

/// One grant a context runs with.
///
/// Nothing is permitted unless some granted capability says so.
pub trait Capability: Send + Sync + fmt::Debug {
    fn id(&self) -> CapabilityId;

    /// Token contributed to the context's `sandbox` attribute.
    fn sandbox_token(&self) -> &'static str;

    /// Judge an action. Return `NotApplicable` for action types this grant
    /// does not cover so other grants get a say.
    fn permits(&self, action: &dyn Action) -> PermissionResult;

    /// Check the grant before it joins a set.
    ///
    /// The default rejects tokens outside the `allow-*` vocabulary.
    fn validate(&self) -> Result<(), CapabilityError> {
        let token = self.sandbox_token();
        let valid = token.strip_prefix("allow-").is_some_and(|rest| {
            !rest.is_empty() && rest.chars().all(|c| c.is_ascii_lowercase() || c == '-')
        });
        if valid {
            Ok(())
        } else {
            Err(CapabilityError::InvalidToken {
                capability: self.id(),
                token: token.to_string(),
            })
        }
    }
}

pub type BoxedCapability = Box<dyn Capability>;

pub type SharedCapability = Arc<dyn Capability>;

/// Standard capability IDs for built-in capabilities.
pub mod standard_ids {
    use super::CapabilityId;

    /// Script execution.
    pub const SCRIPTS: CapabilityId = CapabilityId(std::borrow::Cow::Borrowed("scripts"));

    /// Form submission.
    pub const FORMS: CapabilityId = CapabilityId(std::borrow::Cow::Borrowed("forms"));

    /// Popup windows.
    pub const POPUPS: CapabilityId = CapabilityId(std::borrow::Cow::Borrowed("popups"));

    /// Downloads.
    pub const DOWNLOADS: CapabilityId = CapabilityId(std::borrow::Cow::Borrowed("downloads"));

    /// Same-origin storage.
    pub const SAME_ORIGIN: CapabilityId = CapabilityId(std::borrow::Cow::Borrowed("same_origin"));

    /// Top-level navigation.
    pub const TOP_NAVIGATION: CapabilityId =
        CapabilityId(std::borrow::Cow::Borrowed("top_navigation"));
}
