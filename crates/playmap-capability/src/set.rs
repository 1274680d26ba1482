//! The grant list of one execution context.
//!
//! Checks are deny-by-default: an action passes only if some grant allows
//! it. The same grants render the frame's `sandbox` attribute.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::{debug, info, warn};

use crate::action::Action;
use crate::builtin::{NavigationCapability, PermissionCapability, SandboxPermission};
use crate::capability::{Capability, CapabilityId, DenialReason, PermissionResult, SharedCapability};
use crate::error::{CapabilityError, CapabilityResult};

/// Grants keyed by capability id.
///
/// ```
/// use playmap_capability::CapabilitySet;
///
/// let set = CapabilitySet::playground();
/// assert!(set.sandbox_attribute().contains("allow-scripts"));
/// ```
#[derive(Default)]
pub struct CapabilitySet {
    grants: DashMap<CapabilityId, SharedCapability>,
}

impl CapabilitySet {
    /// A set that grants nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// The grants a preview frame runs with: scripts, forms, popups,
    /// downloads, same-origin storage and top navigation on user gesture.
    pub fn playground() -> Self {
        let grants = DashMap::new();
        for permission in SandboxPermission::ALL {
            let grant: SharedCapability = Arc::new(PermissionCapability::new(permission));
            grants.insert(permission.id(), grant);
        }
        let navigation: SharedCapability = Arc::new(NavigationCapability::user_activation());
        grants.insert(navigation.id(), navigation);
        Self { grants }
    }

    /// Add a grant. Fails if its id is taken or its token is unusable.
    pub fn grant<C: Capability + 'static>(&self, capability: C) -> CapabilityResult<()> {
        self.grant_shared(Arc::new(capability))
    }

    /// Add an already shared grant.
    pub fn grant_shared(&self, capability: SharedCapability) -> CapabilityResult<()> {
        capability.validate()?;
        let id = capability.id();
        let token = capability.sandbox_token();
        match self.grants.entry(id.clone()) {
            Entry::Occupied(_) => Err(CapabilityError::AlreadyGranted(id)),
            Entry::Vacant(slot) => {
                slot.insert(capability);
                info!(capability = %id, token, "Granted");
                Ok(())
            }
        }
    }

    /// Remove a grant, returning it if it was present.
    pub fn revoke(&self, id: &CapabilityId) -> Option<SharedCapability> {
        let (_, removed) = self.grants.remove(id)?;
        info!(capability = %id, "Revoked");
        Some(removed)
    }

    pub fn has(&self, id: &CapabilityId) -> bool {
        self.grants.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.grants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }

    /// Ask every grant about `action`.
    ///
    /// Any `Allowed` wins. Otherwise an explicit denial is reported, and an
    /// action no grant knows about is denied on behalf of `none`.
    pub fn check_permission(&self, action: &dyn Action) -> PermissionResult {
        let action_type = action.action_type();
        let mut denial = None;

        for grant in self.grants.iter() {
            match grant.value().permits(action) {
                PermissionResult::Allowed => {
                    debug!(capability = %grant.key(), action = action_type, "Allowed");
                    return PermissionResult::Allowed;
                }
                PermissionResult::Denied(reason) => {
                    denial.get_or_insert(reason);
                }
                PermissionResult::NotApplicable => {}
            }
        }

        let reason = denial.unwrap_or_else(|| {
            warn!(action = action_type, "No grant covers action");
            DenialReason::new(
                CapabilityId::new("none"),
                action_type,
                "not granted to this context",
            )
        });
        debug!(action = action_type, reason = %reason, "Denied");
        PermissionResult::Denied(reason)
    }

    /// Like [`check_permission`](Self::check_permission), as a `Result`.
    pub fn require(&self, action: &dyn Action) -> CapabilityResult<()> {
        self.check_permission(action).to_result(action.action_type())
    }

    /// The `sandbox` attribute value: granted tokens, sorted and
    /// space-separated. An empty set yields an empty string, which is the
    /// most restrictive sandbox.
    pub fn sandbox_attribute(&self) -> String {
        let mut tokens: Vec<&'static str> = self
            .grants
            .iter()
            .map(|grant| grant.value().sandbox_token())
            .collect();
        tokens.sort_unstable();
        tokens.dedup();
        tokens.join(" ")
    }
}

impl Clone for CapabilitySet {
    fn clone(&self) -> Self {
        let grants = self
            .grants
            .iter()
            .map(|grant| (grant.key().clone(), Arc::clone(grant.value())))
            .collect();
        Self { grants }
    }
}

impl std::fmt::Debug for CapabilitySet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("CapabilitySet")
            .field(&self.sandbox_attribute())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ContextAction;
    use crate::capability::standard_ids;

    const PLAYGROUND_SANDBOX: &str = "allow-downloads allow-forms allow-popups allow-same-origin \
                                      allow-scripts allow-top-navigation-by-user-activation";

    #[test]
    fn test_empty_set_denies() {
        let set = CapabilitySet::new();

        assert!(set.is_empty());
        assert!(set.check_permission(&ContextAction::RunScript).is_denied());
        assert_eq!(set.sandbox_attribute(), "");
    }

    #[test]
    fn test_playground_attribute() {
        let set = CapabilitySet::playground();
        assert_eq!(set.len(), 6);
        assert_eq!(set.sandbox_attribute(), PLAYGROUND_SANDBOX);
    }

    #[test]
    fn test_playground_permissions() {
        let set = CapabilitySet::playground();

        assert!(set.require(&ContextAction::RunScript).is_ok());
        assert!(set.require(&ContextAction::AccessStorage).is_ok());
        assert!(
            set.check_permission(&ContextAction::NavigateTop {
                url: "https://example.com".into(),
                user_gesture: true,
            })
            .is_allowed()
        );
        assert!(matches!(
            set.require(&ContextAction::NavigateTop {
                url: "https://example.com".into(),
                user_gesture: false,
            }),
            Err(CapabilityError::PermissionDenied { .. })
        ));
    }

    #[test]
    fn test_grant_duplicate() {
        let set = CapabilitySet::new();
        set.grant(PermissionCapability::new(SandboxPermission::Scripts))
            .unwrap();

        let result = set.grant(PermissionCapability::new(SandboxPermission::Scripts));
        assert!(matches!(result, Err(CapabilityError::AlreadyGranted(_))));
    }

    #[test]
    fn test_revoke_capability() {
        let set = CapabilitySet::playground();

        assert!(set.revoke(&standard_ids::POPUPS).is_some());
        assert!(!set.has(&standard_ids::POPUPS));
        assert!(!set.sandbox_attribute().contains("allow-popups"));
        assert!(set.check_permission(&ContextAction::OpenPopup).is_denied());
    }

    #[test]
    fn test_custom_grants() {
        let set = CapabilitySet::new();
        set.grant(PermissionCapability::new(SandboxPermission::Scripts))
            .unwrap();
        set.grant(NavigationCapability::always()).unwrap();

        assert_eq!(set.sandbox_attribute(), "allow-scripts allow-top-navigation");
        assert!(set.check_permission(&ContextAction::SubmitForm).is_denied());
    }

    #[test]
    fn test_clone_shares_grants() {
        let set = CapabilitySet::playground();
        let cloned = set.clone();
        assert_eq!(cloned.sandbox_attribute(), set.sandbox_attribute());
    }
}
