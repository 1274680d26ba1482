//! The telemetry relay.
//!
//! One relay serves a whole session. Each run hands it the run id and the
//! reverse registry of the freshly assembled document (`begin_run`), which
//! also clears the log buffer. Incoming messages are decoded, checked
//! against the active run and turned into log entries; uncaught errors are
//! attributed to the file behind their source locator.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use playmap_core::{RelayConfig, RunId};
use playmap_host::MessageInbox;
use playmap_resource::ReverseRegistry;
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::buffer::LogBuffer;
use crate::entry::LogEntry;
use crate::events::{EventDispatcher, RunEvent};
use crate::metrics::{MetricsSnapshot, RelayMetrics};
use crate::protocol::{ContextMessage, ProtocolError};
use crate::report::RunReport;

/// What the relay did with one message.
#[derive(Debug, Clone, PartialEq)]
pub enum RelayOutcome {
    /// The message became this entry.
    Appended(LogEntry),
    /// The message belonged to an earlier run and was dropped.
    Stale {
        /// Run tag of the message.
        message_run: RunId,
        /// The active run.
        active_run: RunId,
    },
    /// The message was malformed and ignored.
    Rejected(ProtocolError),
}

impl RelayOutcome {
    /// Whether an entry was appended.
    pub fn is_appended(&self) -> bool {
        matches!(self, RelayOutcome::Appended(_))
    }
}

#[derive(Debug, Default)]
struct ActiveRun {
    run: Option<RunId>,
    registry: Arc<ReverseRegistry>,
}

/// Receives context messages and maintains the log feed.
pub struct TelemetryRelay {
    config: RelayConfig,
    // Lock order: `active` before `buffer`.
    active: RwLock<ActiveRun>,
    buffer: Mutex<LogBuffer>,
    metrics: RelayMetrics,
    events: Arc<EventDispatcher>,
}

impl TelemetryRelay {
    /// Create a relay with no active run.
    pub fn new(config: RelayConfig) -> Self {
        Self {
            buffer: Mutex::new(LogBuffer::with_capacity(config.buffer_capacity)),
            config,
            active: RwLock::new(ActiveRun::default()),
            metrics: RelayMetrics::new(),
            events: Arc::new(EventDispatcher::new()),
        }
    }

    /// Emit events through `events`.
    pub fn with_events(mut self, events: Arc<EventDispatcher>) -> Self {
        self.events = events;
        self
    }

    /// Wrap in an `Arc` for sharing with a listener task.
    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Relay settings.
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// The event dispatcher.
    pub fn events(&self) -> &Arc<EventDispatcher> {
        &self.events
    }

    /// Start observing `run`, attributing errors through `registry`.
    ///
    /// Clears the log buffer. Call before the run's context is loaded.
    pub fn begin_run(&self, run: RunId, registry: Arc<ReverseRegistry>) {
        let mut active = self.active.write();
        self.buffer.lock().clear();
        active.run = Some(run);
        active.registry = registry;
        drop(active);

        info!(run = %run, "Relay switched to new run");
    }

    /// Point the relay back at an earlier run without touching the buffer.
    ///
    /// Used when a new run was begun but its context never loaded, so the
    /// context of `run` is still the live one.
    pub fn resume_run(&self, run: RunId, registry: Arc<ReverseRegistry>) {
        let mut active = self.active.write();
        active.run = Some(run);
        active.registry = registry;
        drop(active);

        info!(run = %run, "Relay resumed earlier run");
    }

    /// The run currently observed.
    pub fn active_run(&self) -> Option<RunId> {
        self.active.read().run
    }

    /// Handle one raw message.
    pub fn handle(&self, message: &Value) -> RelayOutcome {
        self.metrics.record_received();

        match ContextMessage::decode(message) {
            Ok(decoded) => self.accept(decoded),
            Err(error) => {
                self.metrics.record_rejected();
                warn!(error = %error, "Rejected malformed context message");
                self.events.emit(RunEvent::MessageRejected {
                    reason: error.to_string(),
                });
                RelayOutcome::Rejected(error)
            }
        }
    }

    /// Handle an already decoded message.
    pub fn accept(&self, message: ContextMessage) -> RelayOutcome {
        let active = self.active.read();

        if self.config.discard_stale {
            if let (Some(message_run), Some(active_run)) = (message.run(), active.run) {
                if message_run != active_run {
                    drop(active);
                    self.metrics.record_stale();
                    self.events.emit(RunEvent::StaleMessage {
                        message_run,
                        active_run,
                    });
                    return RelayOutcome::Stale {
                        message_run,
                        active_run,
                    };
                }
            }
        }

        let entry = match message {
            ContextMessage::Log { level, args, run } => LogEntry::console(level, args, run),
            ContextMessage::Error(report) => {
                let file = match active.registry.resolve(&report.source) {
                    Some(name) => name,
                    None => {
                        debug!(locator = %report.source, "Error source not in registry");
                        report.source.as_str()
                    }
                };
                LogEntry::script_error(file, report.line, &report.message, report.run)
            }
        };

        let evicted = self.buffer.lock().push(entry.clone());
        drop(active);

        self.metrics.record_appended(evicted);
        debug!(method = %entry.method, evicted = evicted, "Appended log entry");
        self.events.emit(RunEvent::EntryAppended {
            run: entry.run,
            method: entry.method,
        });

        RelayOutcome::Appended(entry)
    }

    /// Handle every message already queued in `inbox`.
    pub fn pump(&self, inbox: &mut MessageInbox) -> usize {
        let messages = inbox.drain();
        for message in &messages {
            self.handle(message);
        }
        messages.len()
    }

    /// Spawn a task handling messages until every port is dropped.
    ///
    /// Must be called from within a tokio runtime.
    pub fn listen(self: Arc<Self>, mut inbox: MessageInbox) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(message) = inbox.recv().await {
                self.handle(&message);
            }
            debug!("Relay inbox closed");
        })
    }

    /// Log entries, newest first.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.buffer.lock().snapshot()
    }

    /// Number of buffered entries.
    pub fn len(&self) -> usize {
        self.buffer.lock().len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.lock().is_empty()
    }

    /// Empty the buffer without changing the active run.
    pub fn clear(&self) {
        self.buffer.lock().clear();
    }

    /// Counter snapshot.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Report of the active run's feed.
    pub fn report(&self) -> RunReport {
        RunReport::new(self.active_run(), self.entries(), self.metrics())
    }
}

impl Default for TelemetryRelay {
    fn default() -> Self {
        Self::new(RelayConfig::default())
    }
}

impl std::fmt::Debug for TelemetryRelay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelemetryRelay")
            .field("active_run", &self.active_run())
            .field("entries", &self.len())
            .field("metrics", &self.metrics())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::LogMethod;
    use crate::events::{CollectingSubscriber, EventSubscriber};
    use playmap_core::ResolverConfig;
    use playmap_host::message_channel;
    use playmap_resource::{ModuleResolver, ResourceStore};
    use serde_json::json;

    fn registry_with_main() -> (Arc<ReverseRegistry>, String) {
        let config = ResolverConfig::default();
        let resolver = ModuleResolver::new(ResourceStore::new(&config).into_shared(), &config);
        let resolved = resolver.build([("main.js", "boom()")]);
        let locator = resolved.import_map.get("main.js").unwrap().to_string();
        (Arc::new(resolved.registry), locator)
    }

    fn log(level: &str, text: &str) -> Value {
        json!({"event": "LOG", "level": level, "args": [text]})
    }

    #[test]
    fn test_entries_newest_first() {
        let relay = TelemetryRelay::default();
        relay.begin_run(RunId::new(1), Arc::default());

        relay.handle(&log("log", "a"));
        relay.handle(&log("error", "b"));

        let entries = relay.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].method, LogMethod::Error);
        assert_eq!(entries[0].data, vec![json!("b")]);
        assert_eq!(entries[1].method, LogMethod::Log);
        assert_eq!(entries[1].data, vec![json!("a")]);
    }

    #[test]
    fn test_error_attributed_to_file() {
        let relay = TelemetryRelay::default();
        let (registry, locator) = registry_with_main();
        relay.begin_run(RunId::new(1), registry);

        let outcome = relay.handle(&json!({
            "event": "ERROR",
            "level": "error",
            "args": ["boom", locator, 7, 1, null],
        }));

        let RelayOutcome::Appended(entry) = outcome else {
            panic!("expected an appended entry");
        };
        assert_eq!(entry.method, LogMethod::ScriptErr);
        assert_eq!(entry.render(), "(Line 7 main.js) boom");
    }

    #[test]
    fn test_registry_miss_shows_raw_locator() {
        let relay = TelemetryRelay::default();
        let (registry, _) = registry_with_main();
        relay.begin_run(RunId::new(1), registry);

        let outcome = relay.handle(&json!({
            "event": "ERROR",
            "level": "error",
            "args": ["boom", "blob:playmap/gone", 3, 1, null],
        }));

        assert!(outcome.is_appended());
        assert_eq!(relay.entries()[0].render(), "(Line 3 blob:playmap/gone) boom");
    }

    #[test]
    fn test_begin_run_clears_buffer() {
        let relay = TelemetryRelay::default();
        relay.begin_run(RunId::new(1), Arc::default());
        relay.handle(&log("log", "old"));

        relay.begin_run(RunId::new(2), Arc::default());

        assert!(relay.is_empty());
        assert_eq!(relay.active_run(), Some(RunId::new(2)));
    }

    #[test]
    fn test_resume_run_accepts_earlier_context() {
        let relay = TelemetryRelay::default();
        relay.begin_run(RunId::new(1), Arc::default());
        relay.begin_run(RunId::new(2), Arc::default());
        relay.handle(&json!({
            "event": "LOG", "level": "log", "args": ["kept"], "run": 2,
        }));

        relay.resume_run(RunId::new(1), Arc::default());

        assert_eq!(relay.len(), 1);
        assert!(relay.handle(&json!({
            "event": "LOG", "level": "log", "args": ["late"], "run": 1,
        })).is_appended());
    }

    #[test]
    fn test_stale_messages_discarded() {
        let relay = TelemetryRelay::default();
        relay.begin_run(RunId::new(2), Arc::default());

        let outcome = relay.handle(&json!({
            "event": "LOG", "level": "log", "args": ["late"], "run": 1,
        }));
        assert_eq!(
            outcome,
            RelayOutcome::Stale {
                message_run: RunId::new(1),
                active_run: RunId::new(2),
            }
        );

        assert!(relay.handle(&json!({
            "event": "LOG", "level": "log", "args": ["now"], "run": 2,
        })).is_appended());
        assert!(relay.handle(&log("log", "untagged")).is_appended());

        assert_eq!(relay.len(), 2);
        assert_eq!(relay.metrics().stale, 1);
    }

    #[test]
    fn test_stale_filter_can_be_disabled() {
        let relay = TelemetryRelay::new(RelayConfig::default().with_discard_stale(false));
        relay.begin_run(RunId::new(2), Arc::default());

        let outcome = relay.handle(&json!({
            "event": "LOG", "level": "log", "args": ["late"], "run": 1,
        }));
        assert!(outcome.is_appended());
    }

    #[test]
    fn test_malformed_messages_rejected() {
        let collector = Arc::new(CollectingSubscriber::new(10));
        let events = Arc::new(EventDispatcher::new());
        events.subscribe(Arc::clone(&collector) as Arc<dyn EventSubscriber>);
        let relay = TelemetryRelay::default().with_events(events);

        for message in [json!(null), json!({"event": "LOG"}), json!([1, 2])] {
            assert!(matches!(relay.handle(&message), RelayOutcome::Rejected(_)));
        }

        assert!(relay.is_empty());
        assert_eq!(relay.metrics().rejected, 3);
        assert_eq!(relay.metrics().received, 3);
        assert_eq!(collector.event_types(), ["message_rejected"; 3]);
    }

    #[test]
    fn test_buffer_capacity() {
        let relay = TelemetryRelay::new(RelayConfig::default().with_buffer_capacity(2));
        for text in ["a", "b", "c"] {
            relay.handle(&log("log", text));
        }

        let rendered: Vec<_> = relay.entries().iter().map(LogEntry::render).collect();
        assert_eq!(rendered, ["c", "b"]);
        assert_eq!(relay.metrics().evicted, 1);
    }

    #[test]
    fn test_pump() {
        let relay = TelemetryRelay::default();
        let (port, mut inbox) = message_channel();
        port.post(log("log", "a"));
        port.post(log("warn", "b"));

        assert_eq!(relay.pump(&mut inbox), 2);
        assert_eq!(relay.entries()[0].method, LogMethod::Warn);
    }

    #[tokio::test]
    async fn test_listen_until_ports_dropped() {
        let relay = TelemetryRelay::default().into_shared();
        relay.begin_run(RunId::new(1), Arc::default());
        let (port, inbox) = message_channel();

        let task = Arc::clone(&relay).listen(inbox);
        port.post(log("log", "a"));
        port.post(json!({"event": "ERROR", "args": ["x", "blob:playmap/1", 1, 1, null]}));
        drop(port);
        task.await.unwrap();

        assert_eq!(relay.len(), 2);
        assert_eq!(relay.entries()[0].method, LogMethod::ScriptErr);
    }
}
