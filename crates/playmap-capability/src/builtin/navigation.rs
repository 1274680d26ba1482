//! Top-level navigation capability.

use serde::{Deserialize, Serialize};

use crate::action::{Action, action_types};
use crate::capability::{
    Capability, CapabilityId, DenialReason, PermissionResult, standard_ids,
};

/// When top-level navigation is allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationMode {
    /// Only as the direct result of a user gesture.
    #[default]
    UserActivation,
    /// Unconditionally.
    Always,
}

/// Capability governing navigation of the top-level context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NavigationCapability {
    mode: NavigationMode,
}

impl NavigationCapability {
    /// Navigation only on user gesture.
    pub fn user_activation() -> Self {
        Self {
            mode: NavigationMode::UserActivation,
        }
    }

    /// Unrestricted navigation.
    pub fn always() -> Self {
        Self {
            mode: NavigationMode::Always,
        }
    }

    /// The configured mode.
    pub fn mode(&self) -> NavigationMode {
        self.mode
    }
}

impl Capability for NavigationCapability {
    fn id(&self) -> CapabilityId {
        standard_ids::TOP_NAVIGATION
    }

    fn sandbox_token(&self) -> &'static str {
        match self.mode {
            NavigationMode::UserActivation => "allow-top-navigation-by-user-activation",
            NavigationMode::Always => "allow-top-navigation",
        }
    }

    fn permits(&self, action: &dyn Action) -> PermissionResult {
        if action.action_type() != action_types::NAVIGATE_TOP {
            return PermissionResult::NotApplicable;
        }

        match self.mode {
            NavigationMode::Always => PermissionResult::Allowed,
            NavigationMode::UserActivation if action.user_gesture() => PermissionResult::Allowed,
            NavigationMode::UserActivation => PermissionResult::Denied(DenialReason::new(
                self.id(),
                action.action_type(),
                "Top-level navigation requires a user gesture",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ContextAction;

    fn navigate(user_gesture: bool) -> ContextAction {
        ContextAction::NavigateTop {
            url: "https://example.com".to_string(),
            user_gesture,
        }
    }

    #[test]
    fn test_user_activation_mode() {
        let cap = NavigationCapability::user_activation();

        assert!(cap.permits(&navigate(true)).is_allowed());
        assert!(cap.permits(&navigate(false)).is_denied());
        assert_eq!(
            cap.permits(&ContextAction::Download),
            PermissionResult::NotApplicable
        );
    }

    #[test]
    fn test_always_mode() {
        let cap = NavigationCapability::always();
        assert!(cap.permits(&navigate(false)).is_allowed());
        assert_eq!(cap.sandbox_token(), "allow-top-navigation");
    }
}
