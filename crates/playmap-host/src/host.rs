//! Execution hosts.
//!
//! An [`ExecutionHost`] owns at most one live context. Loading a document
//! always creates a fresh context and discards the previous one; nothing
//! inside a context is observable except through the message channel.

use std::sync::Arc;

use parking_lot::RwLock;
use playmap_capability::CapabilitySet;
use playmap_core::RunId;
use tracing::{debug, info};

use crate::channel::MessagePort;
use crate::context::Frame;
use crate::error::{HostError, HostResult};

/// Loads assembled documents into isolated contexts.
pub trait ExecutionHost: Send + Sync {
    /// Load `document` into a fresh context for `run`, replacing any
    /// current one.
    fn load(&self, run: RunId, document: &str) -> HostResult<Frame>;

    /// The live context, if any.
    fn current(&self) -> Option<Frame>;

    /// Discard the live context.
    fn unload(&self) -> Option<Frame>;
}

/// Host rendering each run as one sandboxed frame.
pub struct FrameHost {
    capabilities: Arc<CapabilitySet>,
    port: Option<MessagePort>,
    current: RwLock<Option<Frame>>,
}

impl FrameHost {
    /// Create a host whose frames run with `capabilities`.
    pub fn new(capabilities: CapabilitySet) -> Self {
        Self {
            capabilities: Arc::new(capabilities),
            port: None,
            current: RwLock::new(None),
        }
    }

    /// Host with the preview grants.
    pub fn playground() -> Self {
        Self::new(CapabilitySet::playground())
    }

    /// Connect every frame this host creates to `port`.
    pub fn with_port(mut self, port: MessagePort) -> Self {
        self.port = Some(port);
        self
    }

    /// Grants shared by all frames.
    pub fn capabilities(&self) -> &Arc<CapabilitySet> {
        &self.capabilities
    }

    /// The live frame, or an error if nothing is loaded.
    pub fn require_current(&self) -> HostResult<Frame> {
        self.current().ok_or(HostError::NoContext)
    }
}

impl ExecutionHost for FrameHost {
    fn load(&self, run: RunId, document: &str) -> HostResult<Frame> {
        let mut frame = Frame::new(run, document, Arc::clone(&self.capabilities));
        if let Some(port) = &self.port {
            frame = frame.with_port(port.clone());
        }

        let previous = self.current.write().replace(frame.clone());
        if let Some(previous) = previous {
            debug!(frame = %previous.id(), run = %previous.run(), "Discarded previous context");
        }

        info!(
            frame = %frame.id(),
            run = %run,
            bytes = document.len(),
            sandbox = %frame.sandbox_attribute(),
            "Loaded execution context"
        );
        Ok(frame)
    }

    fn current(&self) -> Option<Frame> {
        self.current.read().clone()
    }

    fn unload(&self) -> Option<Frame> {
        let frame = self.current.write().take();
        if let Some(frame) = &frame {
            info!(frame = %frame.id(), run = %frame.run(), "Unloaded execution context");
        }
        frame
    }
}

impl std::fmt::Debug for FrameHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameHost")
            .field("sandbox", &self.capabilities.sandbox_attribute())
            .field("current", &self.current.read().as_ref().map(Frame::id))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::message_channel;
    use serde_json::json;

    #[test]
    fn test_load_replaces_wholesale() {
        let host = FrameHost::playground();
        assert!(host.current().is_none());
        assert!(matches!(host.require_current(), Err(HostError::NoContext)));

        let first = host.load(RunId::new(1), "<p>one</p>").unwrap();
        let second = host.load(RunId::new(2), "<p>two</p>").unwrap();

        let current = host.current().unwrap();
        assert_ne!(first.id(), second.id());
        assert_eq!(current.id(), second.id());
        assert_eq!(current.run(), RunId::new(2));
        assert_eq!(current.document(), "<p>two</p>");
    }

    #[test]
    fn test_unload() {
        let host = FrameHost::playground();
        host.load(RunId::new(1), "").unwrap();

        assert!(host.unload().is_some());
        assert!(host.current().is_none());
        assert!(host.unload().is_none());
    }

    #[test]
    fn test_frames_share_port() {
        let (port, mut inbox) = message_channel();
        let host = FrameHost::playground().with_port(port);

        let old = host.load(RunId::new(1), "").unwrap();
        let new = host.load(RunId::new(2), "").unwrap();

        assert!(old.post(json!({"run": 1})));
        assert!(new.post(json!({"run": 2})));
        assert_eq!(inbox.drain().len(), 2);
    }
}
