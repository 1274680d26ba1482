//! Playmap Observability
//!
//! This crate carries telemetry out of execution contexts and back to the
//! authoring side:
//!
//! - [`LoggingShim`]: instrumentation injected into every document
//! - [`ContextMessage`]: the validated wire protocol
//! - [`TelemetryRelay`]: decodes messages into the log feed and attributes
//!   errors to files
//! - [`EventDispatcher`]: observable run lifecycle events
//!
//! # Relaying Telemetry
//!
//! ```
//! use std::sync::Arc;
//! use playmap_core::RunId;
//! use playmap_observe::{LogMethod, TelemetryRelay};
//!
//! let relay = TelemetryRelay::default();
//! relay.begin_run(RunId::new(1), Arc::default());
//!
//! relay.handle(&serde_json::json!({"event": "LOG", "level": "log", "args": ["a"]}));
//! relay.handle(&serde_json::json!({"event": "LOG", "level": "error", "args": ["b"]}));
//!
//! let entries = relay.entries();
//! assert_eq!(entries[0].method, LogMethod::Error);
//! assert_eq!(entries[1].method, LogMethod::Log);
//! ```
//!
//! # Event Subscription
//!
//! ```ignore
//! use playmap_observe::{EventDispatcher, LoggingSubscriber};
//! use std::sync::Arc;
//!
//! let dispatcher = Arc::new(EventDispatcher::new());
//! dispatcher.subscribe(Arc::new(LoggingSubscriber::new()));
//!
//! let relay = TelemetryRelay::default().with_events(dispatcher);
//! ```

pub mod buffer;
pub mod entry;
pub mod events;
pub mod metrics;
pub mod protocol;
pub mod relay;
pub mod report;
pub mod shim;

pub use buffer::LogBuffer;
pub use entry::{LogEntry, LogMethod};
pub use events::{
    CollectingSubscriber, EventDispatcher, EventSubscriber, LoggingSubscriber, RunEvent,
};
pub use metrics::{MetricsSnapshot, RelayMetrics};
pub use protocol::{
    ContextMessage, EVENT_ERROR, EVENT_LOG, ErrorReport, LogLevel, ProtocolError, value_text,
};
pub use relay::{RelayOutcome, TelemetryRelay};
pub use report::RunReport;
pub use shim::{LoggingShim, SHIM_MARKER};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::entry::{LogEntry, LogMethod};
    pub use crate::events::{EventDispatcher, EventSubscriber, RunEvent};
    pub use crate::protocol::{ContextMessage, LogLevel, ProtocolError};
    pub use crate::relay::{RelayOutcome, TelemetryRelay};
    pub use crate::report::RunReport;
    pub use crate::shim::LoggingShim;
}
