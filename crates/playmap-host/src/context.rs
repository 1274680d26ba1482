//! Isolated execution contexts.
//!
//! A [`Frame`] is one loaded document together with the grants it runs
//! under. It is created per run and never mutated; the host replaces it
//! wholesale when the next run loads.

use std::sync::Arc;

use playmap_capability::{Action, CapabilityId, CapabilitySet, PermissionResult};
use playmap_core::RunId;
use playmap_core::markup::escape_attribute;
use uuid::Uuid;

use crate::channel::MessagePort;
use crate::error::{HostError, HostResult};

/// One isolated execution context.
#[derive(Clone)]
pub struct Frame {
    id: Uuid,
    run: RunId,
    document: Arc<str>,
    capabilities: Arc<CapabilitySet>,
    port: Option<MessagePort>,
}

impl Frame {
    /// Create a context for `document` with a fresh identity.
    pub fn new(run: RunId, document: impl Into<Arc<str>>, capabilities: Arc<CapabilitySet>) -> Self {
        Self {
            id: Uuid::new_v4(),
            run,
            document: document.into(),
            capabilities,
            port: None,
        }
    }

    /// Connect the context to the parent's message channel.
    pub fn with_port(mut self, port: MessagePort) -> Self {
        self.port = Some(port);
        self
    }

    /// Context identity, unique per load.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The run this context was loaded for.
    pub fn run(&self) -> RunId {
        self.run
    }

    /// The loaded document.
    pub fn document(&self) -> &str {
        &self.document
    }

    /// The grants the context runs with.
    pub fn capabilities(&self) -> &Arc<CapabilitySet> {
        &self.capabilities
    }

    /// Post a message to the parent, as the running document would.
    ///
    /// Best-effort: returns `false` if the context has no channel or the
    /// parent stopped listening.
    pub fn post(&self, message: serde_json::Value) -> bool {
        self.port.as_ref().is_some_and(|port| port.post(message))
    }

    /// Value of the `sandbox` attribute.
    pub fn sandbox_attribute(&self) -> String {
        self.capabilities.sandbox_attribute()
    }

    /// Check if a capability is available.
    pub fn has_capability(&self, id: &CapabilityId) -> bool {
        self.capabilities.has(id)
    }

    /// Check permission for an action.
    pub fn check_permission(&self, action: &dyn Action) -> PermissionResult {
        self.capabilities.check_permission(action)
    }

    /// Require permission for an action.
    pub fn request(&self, action: &dyn Action) -> HostResult<()> {
        match self.check_permission(action) {
            PermissionResult::Allowed => Ok(()),
            PermissionResult::Denied(reason) => Err(HostError::PermissionDenied {
                action: action.action_type().to_string(),
                reason: reason.message,
            }),
            PermissionResult::NotApplicable => Err(HostError::NotGranted {
                action: action.action_type().to_string(),
            }),
        }
    }

    /// Render the context as an `<iframe>` element embedding the document.
    pub fn to_iframe_markup(&self) -> String {
        format!(
            "<iframe data-playmap-frame=\"{}\" data-playmap-run=\"{}\" sandbox=\"{}\" srcdoc=\"{}\"></iframe>",
            self.id,
            self.run.get(),
            escape_attribute(&self.sandbox_attribute()),
            escape_attribute(&self.document),
        )
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("id", &self.id)
            .field("run", &self.run)
            .field("document_len", &self.document.len())
            .field("sandbox", &self.sandbox_attribute())
            .field("connected", &self.port.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use playmap_capability::ContextAction;

    fn frame(document: &str) -> Frame {
        Frame::new(
            RunId::new(3),
            document,
            Arc::new(CapabilitySet::playground()),
        )
    }

    #[test]
    fn test_fresh_identity() {
        assert_ne!(frame("").id(), frame("").id());
    }

    #[test]
    fn test_request_follows_capabilities() {
        let frame = frame("<p>hi</p>");

        assert!(frame.request(&ContextAction::RunScript).is_ok());
        assert!(frame.request(&ContextAction::Download).is_ok());
        assert!(matches!(
            frame.request(&ContextAction::NavigateTop {
                url: "https://example.com".into(),
                user_gesture: false,
            }),
            Err(HostError::PermissionDenied { action, .. }) if action == "navigate:top"
        ));
    }

    #[test]
    fn test_empty_grants_deny() {
        let frame = Frame::new(RunId::new(1), "", Arc::new(CapabilitySet::new()));
        assert!(frame.request(&ContextAction::RunScript).is_err());
        assert_eq!(frame.sandbox_attribute(), "");
    }

    #[test]
    fn test_post_requires_port() {
        let unconnected = frame("");
        assert!(!unconnected.post(serde_json::json!({"event": "LOG"})));

        let (port, mut inbox) = crate::channel::message_channel();
        let connected = frame("").with_port(port);
        assert!(connected.post(serde_json::json!({"event": "LOG"})));
        assert!(inbox.try_recv().is_some());
    }

    #[test]
    fn test_iframe_markup_escapes_document() {
        let frame = frame("<p class=\"x\">a & b</p>");
        let markup = frame.to_iframe_markup();

        assert!(markup.starts_with("<iframe "));
        assert!(markup.contains("data-playmap-run=\"3\""));
        assert!(markup.contains(
            "sandbox=\"allow-downloads allow-forms allow-popups allow-same-origin allow-scripts allow-top-navigation-by-user-activation\""
        ));
        assert!(markup.contains("srcdoc=\"&lt;p class=&quot;x&quot;&gt;a &amp; b&lt;/p&gt;\""));
    }
}
