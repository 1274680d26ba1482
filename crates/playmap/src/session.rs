//! Run orchestration.
//!
//! A [`Session`] drives successive runs of one project:
//!
//! 1. mint a run id
//! 2. assemble the document
//! 3. point the relay at the new run (this clears the log feed)
//! 4. load a fresh context, discarding the previous one
//! 5. release the previous run's references
//!
//! Telemetry from the contexts flows through one message channel into one
//! relay for the whole session.

use std::sync::Arc;

use parking_lot::Mutex;
use playmap_core::{FileTable, RunCounter, RunId};
use playmap_host::{ExecutionHost, Frame, MessageInbox};
use playmap_observe::{EventDispatcher, LogEntry, RunEvent, RunReport, TelemetryRelay};
use playmap_resource::SharedResourceStore;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::PlaymapError;
use crate::assemble::{AssembledDocument, DocumentAssembler};

/// Result of one successful run.
#[derive(Debug, Clone)]
pub struct RunHandle {
    /// The assembled document.
    pub document: Arc<AssembledDocument>,
    /// The context it was loaded into.
    pub frame: Frame,
}

impl RunHandle {
    /// The run id.
    pub fn run(&self) -> RunId {
        self.document.run()
    }
}

/// Successive runs of a project against one host and one relay.
pub struct Session {
    counter: RunCounter,
    assembler: DocumentAssembler,
    store: SharedResourceStore,
    host: Arc<dyn ExecutionHost>,
    relay: Arc<TelemetryRelay>,
    events: Arc<EventDispatcher>,
    inbox: Mutex<Option<MessageInbox>>,
    current: Mutex<Option<Arc<AssembledDocument>>>,
}

impl Session {
    pub(crate) fn new(
        assembler: DocumentAssembler,
        store: SharedResourceStore,
        host: Arc<dyn ExecutionHost>,
        relay: Arc<TelemetryRelay>,
        events: Arc<EventDispatcher>,
        inbox: MessageInbox,
    ) -> Self {
        Self {
            counter: RunCounter::new(),
            assembler,
            store,
            host,
            relay,
            events,
            inbox: Mutex::new(Some(inbox)),
            current: Mutex::new(None),
        }
    }

    /// Run the project.
    ///
    /// On an assembly error nothing changes: the previous context, its
    /// references and the log feed stay as they were. If the host fails to
    /// load the new document, the feed has already been cleared but the
    /// relay goes back to attributing the previous run, whose context is
    /// still the live one.
    pub fn run(&self, files: &FileTable) -> Result<RunHandle, PlaymapError> {
        let run = self.counter.next();
        info!(run = %run, files = files.len(), "Starting run");

        let document = Arc::new(self.assembler.assemble(run, files)?);
        self.events.emit(RunEvent::DocumentAssembled {
            run,
            bytes: document.document().len(),
            specifiers: document.import_map().len(),
        });

        self.relay.begin_run(run, Arc::clone(document.registry()));
        self.events.emit(RunEvent::RunStarted {
            run,
            files: files.len(),
        });

        let frame = match self.host.load(run, document.document()) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(run = %run, error = %e, "Failed to load execution context");
                self.store.release_all(document.references());
                if let Some(previous) = self.current.lock().as_ref() {
                    self.relay
                        .resume_run(previous.run(), Arc::clone(previous.registry()));
                }
                return Err(e.into());
            }
        };
        self.events.emit(RunEvent::ContextLoaded {
            run,
            frame: frame.id(),
        });

        let previous = self.current.lock().replace(Arc::clone(&document));
        if let Some(previous) = previous {
            self.release(&previous);
        }

        Ok(RunHandle { document, frame })
    }

    /// Unload the context and release the current run's references.
    pub fn stop(&self) -> Option<RunId> {
        self.host.unload();
        let current = self.current.lock().take()?;
        self.release(&current);
        Some(current.run())
    }

    /// The document of the latest successful run.
    pub fn current(&self) -> Option<Arc<AssembledDocument>> {
        self.current.lock().clone()
    }

    /// The live context.
    pub fn frame(&self) -> Option<Frame> {
        self.host.current()
    }

    /// Handle every message queued so far. Returns how many were handled.
    ///
    /// Does nothing once the inbox has been moved to a listener task.
    pub fn pump(&self) -> usize {
        match self.inbox.lock().as_mut() {
            Some(inbox) => self.relay.pump(inbox),
            None => 0,
        }
    }

    /// Move the inbox to a background relay task.
    ///
    /// Returns `None` if a listener was already spawned. Must be called
    /// from within a tokio runtime.
    pub fn spawn_listener(&self) -> Option<JoinHandle<()>> {
        let inbox = self.inbox.lock().take()?;
        debug!("Spawning relay listener");
        Some(Arc::clone(&self.relay).listen(inbox))
    }

    /// Log feed of the active run, newest first.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.relay.entries()
    }

    /// Report of the active run.
    pub fn report(&self) -> RunReport {
        self.relay.report()
    }

    /// The relay.
    pub fn relay(&self) -> &Arc<TelemetryRelay> {
        &self.relay
    }

    /// The host.
    pub fn host(&self) -> &Arc<dyn ExecutionHost> {
        &self.host
    }

    /// The resource store backing the references.
    pub fn resource_store(&self) -> &SharedResourceStore {
        &self.store
    }

    fn release(&self, document: &AssembledDocument) {
        let count = self.store.release_all(document.references());
        self.events.emit(RunEvent::ResourcesReleased {
            run: document.run(),
            count,
        });
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("last_run", &self.counter.current())
            .field("relay", &self.relay)
            .finish()
    }
}
