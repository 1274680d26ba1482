//! Observable events of the run lifecycle.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;
use playmap_core::RunId;
use uuid::Uuid;

use crate::entry::LogMethod;

/// Events emitted while runs are assembled, loaded and observed.
#[derive(Debug, Clone)]
pub enum RunEvent {
    /// A run began; the log buffer was cleared.
    RunStarted {
        /// The new run.
        run: RunId,
        /// Number of files in the project.
        files: usize,
    },
    /// A document was assembled.
    DocumentAssembled {
        /// The run.
        run: RunId,
        /// Size of the document in bytes.
        bytes: usize,
        /// Number of import map specifiers.
        specifiers: usize,
    },
    /// A fresh execution context was loaded.
    ContextLoaded {
        /// The run.
        run: RunId,
        /// Context identity.
        frame: Uuid,
    },
    /// References of an earlier run were released.
    ResourcesReleased {
        /// The run they belonged to.
        run: RunId,
        /// Number released.
        count: usize,
    },
    /// The relay appended an entry.
    EntryAppended {
        /// Run tag of the entry.
        run: Option<RunId>,
        /// Entry kind.
        method: LogMethod,
    },
    /// The relay ignored a malformed message.
    MessageRejected {
        /// Why.
        reason: String,
    },
    /// The relay discarded a message from an earlier run.
    StaleMessage {
        /// Run tag of the message.
        message_run: RunId,
        /// The active run.
        active_run: RunId,
    },
}

impl RunEvent {
    /// Get the event type name.
    pub fn event_type(&self) -> &'static str {
        match self {
            RunEvent::RunStarted { .. } => "run_started",
            RunEvent::DocumentAssembled { .. } => "document_assembled",
            RunEvent::ContextLoaded { .. } => "context_loaded",
            RunEvent::ResourcesReleased { .. } => "resources_released",
            RunEvent::EntryAppended { .. } => "entry_appended",
            RunEvent::MessageRejected { .. } => "message_rejected",
            RunEvent::StaleMessage { .. } => "stale_message",
        }
    }
}

/// Subscriber for run events.
pub trait EventSubscriber: Send + Sync {
    /// Called when an event occurs.
    fn on_event(&self, event: &RunEvent);

    /// Event types this subscriber wants. `None` receives everything.
    fn event_filter(&self) -> Option<Vec<&'static str>> {
        None
    }
}

/// Subscriber forwarding events to `tracing`.
#[derive(Debug, Default)]
pub struct LoggingSubscriber;

impl LoggingSubscriber {
    /// Create a new logging subscriber.
    pub fn new() -> Self {
        Self
    }
}

impl EventSubscriber for LoggingSubscriber {
    fn on_event(&self, event: &RunEvent) {
        match event {
            RunEvent::RunStarted { run, files } => {
                tracing::info!(event = "run_started", run = %run, files = files, "Run started");
            }
            RunEvent::DocumentAssembled {
                run,
                bytes,
                specifiers,
            } => {
                tracing::debug!(
                    event = "document_assembled",
                    run = %run,
                    bytes = bytes,
                    specifiers = specifiers,
                    "Document assembled"
                );
            }
            RunEvent::ContextLoaded { run, frame } => {
                tracing::info!(event = "context_loaded", run = %run, frame = %frame, "Context loaded");
            }
            RunEvent::ResourcesReleased { run, count } => {
                tracing::debug!(
                    event = "resources_released",
                    run = %run,
                    count = count,
                    "Resources released"
                );
            }
            RunEvent::EntryAppended { run, method } => {
                tracing::trace!(
                    event = "entry_appended",
                    run = ?run.map(|r| r.get()),
                    method = %method,
                    "Entry appended"
                );
            }
            RunEvent::MessageRejected { reason } => {
                tracing::warn!(event = "message_rejected", reason = reason, "Message rejected");
            }
            RunEvent::StaleMessage {
                message_run,
                active_run,
            } => {
                tracing::debug!(
                    event = "stale_message",
                    message_run = %message_run,
                    active_run = %active_run,
                    "Stale message discarded"
                );
            }
        }
    }
}

/// Keeps the most recent events in memory.
pub struct CollectingSubscriber {
    events: RwLock<VecDeque<(Instant, RunEvent)>>,
    capacity: usize,
}

impl CollectingSubscriber {
    /// Keep at most `capacity` events, dropping the oldest.
    pub fn new(capacity: usize) -> Self {
        Self {
            events: RwLock::new(VecDeque::new()),
            capacity,
        }
    }

    /// Collected events, oldest first.
    pub fn events(&self) -> Vec<(Instant, RunEvent)> {
        self.events.read().iter().cloned().collect()
    }

    /// Event type names in order of arrival.
    pub fn event_types(&self) -> Vec<&'static str> {
        self.events
            .read()
            .iter()
            .map(|(_, event)| event.event_type())
            .collect()
    }

    pub fn clear(&self) {
        self.events.write().clear();
    }

    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }
}

impl EventSubscriber for CollectingSubscriber {
    fn on_event(&self, event: &RunEvent) {
        if self.capacity == 0 {
            return;
        }
        let mut events = self.events.write();
        if events.len() == self.capacity {
            events.pop_front();
        }
        events.push_back((Instant::now(), event.clone()));
    }
}

struct Subscription {
    subscriber: Arc<dyn EventSubscriber>,
    filter: Option<Vec<&'static str>>,
}

impl Subscription {
    fn wants(&self, event_type: &str) -> bool {
        self.filter
            .as_ref()
            .is_none_or(|types| types.contains(&event_type))
    }
}

/// Fans run events out to subscribers.
///
/// A subscriber's filter is read once, when it subscribes.
#[derive(Default)]
pub struct EventDispatcher {
    subscriptions: RwLock<Vec<Subscription>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a subscriber.
    pub fn subscribe(&self, subscriber: Arc<dyn EventSubscriber>) {
        let filter = subscriber.event_filter();
        self.subscriptions
            .write()
            .push(Subscription { subscriber, filter });
    }

    /// Drop every subscriber.
    pub fn clear_subscribers(&self) {
        self.subscriptions.write().clear();
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscriptions.read().len()
    }

    /// Deliver an event to every interested subscriber.
    pub fn emit(&self, event: RunEvent) {
        let event_type = event.event_type();
        for subscription in self.subscriptions.read().iter() {
            if subscription.wants(event_type) {
                subscription.subscriber.on_event(&event);
            }
        }
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
