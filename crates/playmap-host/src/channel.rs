//! Cross-context message channel.
//!
//! The context side holds a [`MessagePort`] and posts JSON values to the
//! parent; the relay side drains a [`MessageInbox`]. Delivery is
//! best-effort and unacknowledged: posting never fails the sender, and
//! messages are accepted from any port cloned off the channel.

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::debug;

/// Create a connected port/inbox pair.
pub fn message_channel() -> (MessagePort, MessageInbox) {
    let (tx, rx) = mpsc::unbounded_channel();
    (MessagePort { tx }, MessageInbox { rx })
}

/// Sending half, handed to execution contexts.
#[derive(Debug, Clone)]
pub struct MessagePort {
    tx: mpsc::UnboundedSender<Value>,
}

impl MessagePort {
    /// Post a message to the parent. Returns whether it was queued.
    pub fn post(&self, message: Value) -> bool {
        match self.tx.send(message) {
            Ok(()) => true,
            Err(_) => {
                debug!("Message dropped, inbox is gone");
                false
            }
        }
    }

    /// Check whether the inbox has been dropped or closed.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Receiving half, owned by the telemetry relay.
#[derive(Debug)]
pub struct MessageInbox {
    rx: mpsc::UnboundedReceiver<Value>,
}

impl MessageInbox {
    /// Wait for the next message. `None` once every port is dropped.
    pub async fn recv(&mut self) -> Option<Value> {
        self.rx.recv().await
    }

    /// Take the next message if one is queued.
    pub fn try_recv(&mut self) -> Option<Value> {
        self.rx.try_recv().ok()
    }

    /// Take every queued message.
    pub fn drain(&mut self) -> Vec<Value> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }

    /// Stop accepting messages. Queued ones can still be received.
    pub fn close(&mut self) {
        self.rx.close();
    }
}
