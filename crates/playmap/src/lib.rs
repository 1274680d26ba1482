//! # Playmap - Sandboxed Multi-File Previews
//!
//! Playmap turns a set of authored files (markup, style, script) into one
//! self-contained document, runs it in an isolated execution context and
//! relays the context's console output and uncaught errors back, attributed
//! to the files that produced them.
//!
//! ## Quick Start
//!
//! ```
//! use playmap::prelude::*;
//!
//! let runtime = Playmap::builder().build().unwrap();
//! let session = runtime.session();
//!
//! let handle = session.run(&seed_project()).unwrap();
//! handle.frame.post(serde_json::json!({
//!     "event": "LOG", "level": "log", "args": ["ready"], "run": handle.run().get(),
//! }));
//! session.pump();
//!
//! assert_eq!(session.entries()[0].render(), "ready");
//! ```
//!
//! ## Pipeline
//!
//! ```text
//! ┌────────────┐    ┌──────────────────┐    ┌──────────────┐
//! │ FileTable  │───▶│ DocumentAssembler│───▶│ FrameHost    │
//! └────────────┘    │  resolver + shim │    │  (sandbox)   │
//!                   └────────┬─────────┘    └──────┬───────┘
//!                            │ registry            │ messages
//!                            ▼                     ▼
//!                   ┌─────────────────────────────────────┐
//!                   │          TelemetryRelay             │
//!                   │   decode → attribute → log feed     │
//!                   └─────────────────────────────────────┘
//! ```

pub mod assemble;
pub mod session;

use std::sync::Arc;

use playmap_capability::{BoxedCapability, Capability, CapabilityId, CapabilitySet};
use playmap_core::{
    ConfigError, FileTable, PlaymapConfig, ProjectConfig, RelayConfig, ResolverConfig, RunId,
};
use playmap_host::{ExecutionHost, FrameHost, message_channel};
use playmap_observe::{EventDispatcher, EventSubscriber, TelemetryRelay};
use playmap_resource::{ModuleResolver, ResourceStore, SharedResourceStore};

pub use assemble::{AssembledDocument, AssemblyError, DocumentAssembler};
pub use session::{RunHandle, Session};

// Re-export from sub-crates
pub use playmap_capability;
pub use playmap_core;
pub use playmap_host;
pub use playmap_observe;
pub use playmap_resource;

/// Main entry point for Playmap.
pub struct Playmap;

impl Playmap {
    /// Create a new runtime builder.
    pub fn builder() -> PlaymapBuilder {
        PlaymapBuilder::new()
    }

    /// Create a runtime with default configuration.
    pub fn with_defaults() -> Result<PlaymapRuntime, PlaymapError> {
        PlaymapBuilder::new().build()
    }
}

/// Builder for configuring the runtime.
pub struct PlaymapBuilder {
    config: PlaymapConfig,
    capabilities: CapabilitySet,
    extra_capabilities: Vec<BoxedCapability>,
    revoked: Vec<CapabilityId>,
    event_subscribers: Vec<Arc<dyn EventSubscriber>>,
}

impl PlaymapBuilder {
    /// Create a builder with default configuration and preview grants.
    pub fn new() -> Self {
        Self {
            config: PlaymapConfig::default(),
            capabilities: CapabilitySet::playground(),
            extra_capabilities: Vec::new(),
            revoked: Vec::new(),
            event_subscribers: Vec::new(),
        }
    }

    // Configuration

    /// Replace the whole configuration.
    pub fn with_config(mut self, config: PlaymapConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the resolver section.
    pub fn with_resolver(mut self, resolver: ResolverConfig) -> Self {
        self.config.resolver = resolver;
        self
    }

    /// Set the relay section.
    pub fn with_relay(mut self, relay: RelayConfig) -> Self {
        self.config.relay = relay;
        self
    }

    /// Set the project section.
    pub fn with_project(mut self, project: ProjectConfig) -> Self {
        self.config.project = project;
        self
    }

    /// Set the entry document name.
    pub fn with_entry_file(mut self, name: impl Into<String>) -> Self {
        self.config.project.entry_file = name.into();
        self
    }

    /// Bound the log feed.
    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.config.relay.buffer_capacity = Some(capacity);
        self
    }

    /// Enable or disable dropping messages from earlier runs.
    pub fn with_discard_stale(mut self, enabled: bool) -> Self {
        self.config.relay.discard_stale = enabled;
        self
    }

    // Capabilities

    /// Replace the grants contexts run with.
    pub fn with_capabilities(mut self, capabilities: CapabilitySet) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Grant an additional capability.
    pub fn with_capability<C: Capability + 'static>(mut self, capability: C) -> Self {
        self.extra_capabilities.push(Box::new(capability));
        self
    }

    /// Withdraw a grant.
    pub fn without_capability(mut self, id: CapabilityId) -> Self {
        self.revoked.push(id);
        self
    }

    // Observability

    /// Add an event subscriber.
    pub fn with_event_subscriber(mut self, subscriber: Arc<dyn EventSubscriber>) -> Self {
        self.event_subscribers.push(subscriber);
        self
    }

    /// Build the runtime.
    pub fn build(self) -> Result<PlaymapRuntime, PlaymapError> {
        self.config.validate()?;

        let capabilities = self.capabilities;
        for id in &self.revoked {
            capabilities.revoke(id);
        }
        for capability in self.extra_capabilities {
            capabilities.grant_shared(capability.into())?;
        }

        let event_dispatcher = EventDispatcher::new();
        for subscriber in self.event_subscribers {
            event_dispatcher.subscribe(subscriber);
        }

        let store = ResourceStore::new(&self.config.resolver).into_shared();

        Ok(PlaymapRuntime {
            config: self.config,
            store,
            capabilities: Arc::new(capabilities),
            event_dispatcher: Arc::new(event_dispatcher),
        })
    }
}

impl Default for PlaymapBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A configured runtime.
pub struct PlaymapRuntime {
    config: PlaymapConfig,
    store: SharedResourceStore,
    capabilities: Arc<CapabilitySet>,
    event_dispatcher: Arc<EventDispatcher>,
}

impl PlaymapRuntime {
    /// The configuration.
    pub fn config(&self) -> &PlaymapConfig {
        &self.config
    }

    /// The resource store shared by every assembler of this runtime.
    pub fn resource_store(&self) -> &SharedResourceStore {
        &self.store
    }

    /// Grants for new contexts.
    pub fn capabilities(&self) -> &Arc<CapabilitySet> {
        &self.capabilities
    }

    /// Get the event dispatcher.
    pub fn event_dispatcher(&self) -> &Arc<EventDispatcher> {
        &self.event_dispatcher
    }

    /// Create a module resolver.
    pub fn resolver(&self) -> ModuleResolver {
        ModuleResolver::new(Arc::clone(&self.store), &self.config.resolver)
    }

    /// Create a document assembler.
    pub fn assembler(&self) -> DocumentAssembler {
        DocumentAssembler::new(self.resolver(), &self.config.project)
    }

    /// Assemble a project once, outside any session.
    pub fn assemble(&self, run: RunId, files: &FileTable) -> Result<AssembledDocument, PlaymapError> {
        Ok(self.assembler().assemble(run, files)?)
    }

    /// Create a relay configured for this runtime.
    pub fn relay(&self) -> TelemetryRelay {
        TelemetryRelay::new(self.config.relay.clone())
            .with_events(Arc::clone(&self.event_dispatcher))
    }

    /// Start a session with a frame host wired to a fresh message channel.
    pub fn session(&self) -> Session {
        let (port, inbox) = message_channel();
        let host = FrameHost::new((*self.capabilities).clone()).with_port(port);
        self.session_with_host(Arc::new(host), inbox)
    }

    /// Start a session on a custom host.
    ///
    /// The host is expected to deliver context messages to the port
    /// paired with `inbox`.
    pub fn session_with_host(
        &self,
        host: Arc<dyn ExecutionHost>,
        inbox: playmap_host::MessageInbox,
    ) -> Session {
        Session::new(
            self.assembler(),
            Arc::clone(&self.store),
            host,
            self.relay().into_shared(),
            Arc::clone(&self.event_dispatcher),
            inbox,
        )
    }
}

impl std::fmt::Debug for PlaymapRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaymapRuntime")
            .field("config", &self.config)
            .field("sandbox", &self.capabilities.sandbox_attribute())
            .finish()
    }
}

/// Errors from the Playmap runtime.
#[derive(Debug, thiserror::Error)]
pub enum PlaymapError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Archive error.
    #[error("Archive error: {0}")]
    Archive(#[from] playmap_core::ArchiveError),

    /// Store error.
    #[error("Store error: {0}")]
    Store(#[from] playmap_core::StoreError),

    /// Resource error.
    #[error("Resource error: {0}")]
    Resource(#[from] playmap_resource::ResourceError),

    /// Capability error.
    #[error("Capability error: {0}")]
    Capability(#[from] playmap_capability::CapabilityError),

    /// Host error.
    #[error("Host error: {0}")]
    Host(#[from] playmap_host::HostError),

    /// Assembly error.
    #[error("Assembly error: {0}")]
    Assembly(#[from] AssemblyError),

    /// Protocol error.
    #[error("Protocol error: {0}")]
    Protocol(#[from] playmap_observe::ProtocolError),
}

/// Prelude module for convenient imports.
pub mod prelude {
    // Main types
    pub use crate::{
        AssembledDocument, AssemblyError, DocumentAssembler, Playmap, PlaymapBuilder,
        PlaymapError, PlaymapRuntime, RunHandle, Session,
    };

    // Core types
    pub use playmap_core::{
        FileTable, MemoryStore, PlaymapConfig, ProjectStore, RunId, SourceFile, archive,
        seed_project,
    };

    // Capability types
    pub use playmap_capability::{
        CapabilityId, CapabilitySet, ContextAction, NavigationCapability, SandboxPermission,
    };

    // Host types
    pub use playmap_host::{ExecutionHost, Frame, FrameHost};

    // Observability types
    pub use playmap_observe::{
        EventDispatcher, EventSubscriber, LogEntry, LogMethod, RunEvent, TelemetryRelay,
    };

    // Common std types
    pub use std::sync::Arc;
}
