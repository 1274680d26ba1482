//! Built-in capabilities for execution contexts.
//!
//! - [`PermissionCapability`]: one plain grant (scripts, forms, popups,
//!   downloads, same-origin storage)
//! - [`NavigationCapability`]: top-level navigation, optionally limited to
//!   user gestures

mod navigation;
mod permission;

pub use navigation::{NavigationCapability, NavigationMode};
pub use permission::{PermissionCapability, SandboxPermission};
