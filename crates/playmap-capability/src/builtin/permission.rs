//! Plain sandbox grants.

use serde::{Deserialize, Serialize};

use crate::action::{Action, action_types};
use crate::capability::{Capability, CapabilityId, PermissionResult, standard_ids};

/// A grant that allows exactly one kind of action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SandboxPermission {
    /// Script execution.
    Scripts,
    /// Form submission.
    Forms,
    /// Popup windows.
    Popups,
    /// Downloads.
    Downloads,
    /// Same-origin storage.
    SameOrigin,
}

impl SandboxPermission {
    /// All plain permissions.
    pub const ALL: [SandboxPermission; 5] = [
        SandboxPermission::Scripts,
        SandboxPermission::Forms,
        SandboxPermission::Popups,
        SandboxPermission::Downloads,
        SandboxPermission::SameOrigin,
    ];

    /// Capability id of the grant.
    pub fn id(&self) -> CapabilityId {
        match self {
            SandboxPermission::Scripts => standard_ids::SCRIPTS,
            SandboxPermission::Forms => standard_ids::FORMS,
            SandboxPermission::Popups => standard_ids::POPUPS,
            SandboxPermission::Downloads => standard_ids::DOWNLOADS,
            SandboxPermission::SameOrigin => standard_ids::SAME_ORIGIN,
        }
    }

    /// `sandbox` attribute token.
    pub fn token(&self) -> &'static str {
        match self {
            SandboxPermission::Scripts => "allow-scripts",
            SandboxPermission::Forms => "allow-forms",
            SandboxPermission::Popups => "allow-popups",
            SandboxPermission::Downloads => "allow-downloads",
            SandboxPermission::SameOrigin => "allow-same-origin",
        }
    }

    /// Action type the grant allows.
    pub fn action_type(&self) -> &'static str {
        match self {
            SandboxPermission::Scripts => action_types::RUN_SCRIPT,
            SandboxPermission::Forms => action_types::SUBMIT_FORM,
            SandboxPermission::Popups => action_types::OPEN_POPUP,
            SandboxPermission::Downloads => action_types::DOWNLOAD,
            SandboxPermission::SameOrigin => action_types::SAME_ORIGIN_STORAGE,
        }
    }
}

/// Capability wrapping one [`SandboxPermission`].
///
/// # Example
///
/// ```
/// use playmap_capability::builtin::{PermissionCapability, SandboxPermission};
/// use playmap_capability::Capability;
///
/// let cap = PermissionCapability::new(SandboxPermission::Scripts);
/// assert_eq!(cap.sandbox_token(), "allow-scripts");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionCapability {
    permission: SandboxPermission,
}

impl PermissionCapability {
    /// Create a capability for one permission.
    pub fn new(permission: SandboxPermission) -> Self {
        Self { permission }
    }

    /// The wrapped permission.
    pub fn permission(&self) -> SandboxPermission {
        self.permission
    }
}

impl Capability for PermissionCapability {
    fn id(&self) -> CapabilityId {
        self.permission.id()
    }

    fn sandbox_token(&self) -> &'static str {
        self.permission.token()
    }

    fn permits(&self, action: &dyn Action) -> PermissionResult {
        if action.action_type() == self.permission.action_type() {
            PermissionResult::Allowed
        } else {
            PermissionResult::NotApplicable
        }
    }
}
