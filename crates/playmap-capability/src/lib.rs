//! Playmap Capability System
//!
//! Capabilities are the explicit grants an execution context runs with.
//! They decide which actions a preview document may attempt and render
//! the `sandbox` attribute of the frame that hosts it.
//!
//! # Model
//!
//! - Every permission must be granted; an empty set denies everything
//! - Each grant contributes exactly one sandbox token
//! - Grants are fixed once a frame is created
//!
//! # Built-in Capabilities
//!
//! - [`PermissionCapability`]: scripts, forms, popups, downloads and
//!   same-origin storage
//! - [`NavigationCapability`]: top-level navigation, by default only on
//!   user activation
//!
//! # Usage
//!
//! ```
//! use playmap_capability::{
//!     CapabilitySet, ContextAction, PermissionCapability, SandboxPermission,
//! };
//!
//! let capabilities = CapabilitySet::new();
//! capabilities
//!     .grant(PermissionCapability::new(SandboxPermission::Scripts))
//!     .unwrap();
//!
//! assert!(capabilities.check_permission(&ContextAction::RunScript).is_allowed());
//! assert_eq!(capabilities.sandbox_attribute(), "allow-scripts");
//! ```

pub mod action;
pub mod builtin;
pub mod capability;
pub mod error;
pub mod set;

pub use action::{Action, ContextAction, action_types};
pub use capability::{
    BoxedCapability, Capability, CapabilityId, DenialReason, PermissionResult, SharedCapability,
    standard_ids,
};
pub use error::{CapabilityError, CapabilityResult};
pub use set::CapabilitySet;

pub use builtin::{NavigationCapability, NavigationMode, PermissionCapability, SandboxPermission};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::action::{Action, ContextAction};
    pub use crate::capability::{Capability, CapabilityId, PermissionResult};
    pub use crate::error::{CapabilityError, CapabilityResult};
    pub use crate::set::CapabilitySet;

    pub use crate::builtin::{NavigationCapability, PermissionCapability, SandboxPermission};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prelude_imports() {
        use crate::prelude::*;

        let _ = CapabilityId::new("test");
        let _ = CapabilitySet::new();
    }

    #[test]
    fn test_playground_grants() {
        let set = CapabilitySet::playground();

        for id in [
            standard_ids::SCRIPTS,
            standard_ids::FORMS,
            standard_ids::POPUPS,
            standard_ids::DOWNLOADS,
            standard_ids::SAME_ORIGIN,
            standard_ids::TOP_NAVIGATION,
        ] {
            assert!(set.has(&id), "missing {id}");
        }
    }
}
