//! Playmap Execution Host
//!
//! This crate loads assembled documents into isolated execution contexts
//! and carries their telemetry back out:
//!
//! - [`ExecutionHost`]: the host contract (load, current, unload)
//! - [`FrameHost`]: one sandboxed `<iframe>` per run, replaced wholesale
//! - [`Frame`]: a loaded context with its capability set
//! - [`message_channel`]: the best-effort context → parent channel
//!
//! # Example
//!
//! ```
//! use playmap_core::RunId;
//! use playmap_host::{ExecutionHost, FrameHost, message_channel};
//!
//! let (port, mut inbox) = message_channel();
//! let host = FrameHost::playground().with_port(port);
//!
//! let frame = host.load(RunId::new(1), "<p>hi</p>").unwrap();
//! frame.post(serde_json::json!({"event": "LOG", "level": "log", "args": ["hi"]}));
//!
//! assert!(inbox.try_recv().is_some());
//! ```

pub mod channel;
pub mod context;
pub mod error;
pub mod host;

pub use channel::{MessageInbox, MessagePort, message_channel};
pub use context::Frame;
pub use error::{HostError, HostResult};
pub use host::{ExecutionHost, FrameHost};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::channel::{MessageInbox, MessagePort, message_channel};
    pub use crate::context::Frame;
    pub use crate::error::{HostError, HostResult};
    pub use crate::host::{ExecutionHost, FrameHost};
}
