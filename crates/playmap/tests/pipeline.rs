//! End-to-end tests of the assemble → load → relay pipeline.

use std::sync::Arc;

use playmap::prelude::*;
use playmap_core::markup::outline;
use std::sync::atomic::{AtomicBool, Ordering};

use playmap_core::{ArchiveError, KeyValueStore};
use playmap_host::{HostError, HostResult, message_channel};
use playmap_observe::CollectingSubscriber;
use serde_json::{Value, json};

fn project() -> FileTable {
    let mut files = FileTable::new();
    files.create(
        "1",
        "index.html",
        "<!doctype html><html><head><script src=\"greet.js\"></script></head>\
         <body><script type=\"module\">import \"main.js\";</script></body></html>",
    );
    files.create("2", "main.js", "throw new Error('boom');");
    files.create("3", "greet.js", "console.log('hi');");
    files.create("4", "style.css", "body {}");
    files
}

fn log(run: RunId, level: &str, text: &str) -> Value {
    json!({"event": "LOG", "level": level, "args": [text], "run": run.get()})
}

#[test]
fn import_map_covers_every_file_twice() {
    let runtime = Playmap::with_defaults().unwrap();
    let document = runtime.assemble(RunId::new(1), &project()).unwrap();

    let map = document.import_map();
    assert_eq!(map.len(), 2 * project().len());
    for reference in map.imports.values() {
        assert!(document.registry().contains(reference));
    }
    for name in ["main.js", "/main.js", "style.css", "/index.html"] {
        assert!(map.get(name).is_some(), "missing specifier {name}");
    }
}

#[test]
fn shim_runs_before_any_user_script() {
    let runtime = Playmap::with_defaults().unwrap();
    let document = runtime.assemble(RunId::new(1), &project()).unwrap();
    let text = document.document();

    let scripts = outline(text).scripts;
    assert_eq!(scripts.len(), 4);
    assert!(scripts[0].raw(text).contains("data-playmap=\"console\""));
    assert!(scripts[1].raw(text).contains("importmap"));
    assert!(scripts[2].raw(text).contains("greet.js"));
}

#[test]
fn log_feed_is_most_recent_first() {
    let runtime = Playmap::with_defaults().unwrap();
    let session = runtime.session();
    let handle = session.run(&project()).unwrap();

    handle.frame.post(log(handle.run(), "log", "a"));
    handle.frame.post(log(handle.run(), "error", "b"));
    assert_eq!(session.pump(), 2);

    let entries = session.entries();
    assert_eq!(entries.len(), 2);
    assert_eq!((entries[0].method, entries[0].data.clone()), (LogMethod::Error, vec![json!("b")]));
    assert_eq!((entries[1].method, entries[1].data.clone()), (LogMethod::Log, vec![json!("a")]));
}

#[test]
fn uncaught_error_is_attributed_to_its_file() {
    let runtime = Playmap::with_defaults().unwrap();
    let session = runtime.session();
    let handle = session.run(&project()).unwrap();
    let locator = handle.document.import_map().get("main.js").unwrap().to_string();

    handle.frame.post(json!({
        "event": "ERROR",
        "level": "error",
        "args": ["boom", locator, 7, 1, {"message": "boom"}],
        "run": handle.run().get(),
    }));
    handle.frame.post(json!({
        "event": "ERROR",
        "level": "error",
        "args": ["lost", "https://cdn.example/lib.js", 2, 1, null],
        "run": handle.run().get(),
    }));
    session.pump();

    let rendered: Vec<String> = session.entries().iter().map(LogEntry::render).collect();
    assert_eq!(
        rendered,
        ["(Line 2 https://cdn.example/lib.js) lost", "(Line 7 main.js) boom"]
    );
    assert!(session.entries().iter().all(|e| e.method == LogMethod::ScriptErr));
}

#[test]
fn new_run_clears_feed_and_drops_stale_messages() {
    let runtime = Playmap::with_defaults().unwrap();
    let session = runtime.session();

    let first = session.run(&project()).unwrap();
    first.frame.post(log(first.run(), "log", "first"));
    session.pump();
    assert_eq!(session.entries().len(), 1);

    let second = session.run(&project()).unwrap();
    assert!(session.entries().is_empty());
    assert_ne!(first.frame.id(), second.frame.id());
    assert_eq!(session.frame().unwrap().id(), second.frame.id());

    first.frame.post(log(first.run(), "log", "late"));
    second.frame.post(log(second.run(), "log", "current"));
    session.pump();

    let rendered: Vec<String> = session.entries().iter().map(LogEntry::render).collect();
    assert_eq!(rendered, ["current"]);
    assert_eq!(session.relay().metrics().stale, 1);
}

#[test]
fn previous_references_released_after_next_load() {
    let collector = Arc::new(CollectingSubscriber::new(64));
    let runtime = Playmap::builder()
        .with_event_subscriber(Arc::clone(&collector) as Arc<dyn EventSubscriber>)
        .build()
        .unwrap();
    let session = runtime.session();
    let store = Arc::clone(session.resource_store());

    let first = session.run(&project()).unwrap();
    assert_eq!(store.len(), 4);

    let second = session.run(&project()).unwrap();
    assert_eq!(store.len(), 4);
    for reference in first.document.references() {
        assert!(!store.contains(reference));
    }
    for reference in second.document.references() {
        assert!(store.contains(reference));
    }

    assert_eq!(session.stop(), Some(second.run()));
    assert!(store.is_empty());
    assert!(session.frame().is_none());

    let types = collector.event_types();
    assert_eq!(
        types,
        [
            "document_assembled",
            "run_started",
            "context_loaded",
            "document_assembled",
            "run_started",
            "context_loaded",
            "resources_released",
            "resources_released",
        ]
    );
}

#[test]
fn failed_assembly_keeps_previous_run() {
    let runtime = Playmap::with_defaults().unwrap();
    let session = runtime.session();
    let first = session.run(&project()).unwrap();
    first.frame.post(log(first.run(), "log", "kept"));
    session.pump();

    let mut broken = project();
    broken.remove(&"1".into());
    let err = session.run(&broken).unwrap_err();

    assert!(matches!(err, PlaymapError::Assembly(AssemblyError::MissingEntry(_))));
    assert_eq!(session.current().unwrap().run(), first.run());
    assert_eq!(session.entries().len(), 1);
}

/// Frame host that can be told to refuse the next document.
struct FlakyHost {
    inner: FrameHost,
    refuse: AtomicBool,
}

impl ExecutionHost for FlakyHost {
    fn load(&self, run: RunId, document: &str) -> HostResult<Frame> {
        if self.refuse.load(Ordering::SeqCst) {
            return Err(HostError::NoContext);
        }
        self.inner.load(run, document)
    }

    fn current(&self) -> Option<Frame> {
        self.inner.current()
    }

    fn unload(&self) -> Option<Frame> {
        self.inner.unload()
    }
}

#[test]
fn failed_load_keeps_previous_context_observed() {
    let runtime = Playmap::with_defaults().unwrap();
    let (port, inbox) = message_channel();
    let host = Arc::new(FlakyHost {
        inner: FrameHost::playground().with_port(port),
        refuse: AtomicBool::new(false),
    });
    let session = runtime.session_with_host(Arc::clone(&host) as Arc<dyn ExecutionHost>, inbox);
    let store = Arc::clone(session.resource_store());

    let first = session.run(&project()).unwrap();
    host.refuse.store(true, Ordering::SeqCst);
    let err = session.run(&project()).unwrap_err();

    assert!(matches!(err, PlaymapError::Host(HostError::NoContext)));
    assert_eq!(store.len(), 4);
    assert_eq!(session.current().unwrap().run(), first.run());
    assert_eq!(session.relay().active_run(), Some(first.run()));

    let locator = first.document.import_map().get("main.js").unwrap().to_string();
    first.frame.post(json!({
        "event": "ERROR", "level": "error", "run": first.run().get(),
        "args": ["boom", locator, 2, 1, {}],
    }));
    session.pump();

    let rendered: Vec<String> = session.entries().iter().map(LogEntry::render).collect();
    assert_eq!(rendered, ["(Line 2 main.js) boom"]);
    assert_eq!(session.relay().metrics().stale, 0);
}

#[test]
fn frame_carries_playground_sandbox() {
    let runtime = Playmap::with_defaults().unwrap();
    let session = runtime.session();
    let handle = session.run(&project()).unwrap();

    let iframe = handle.frame.to_iframe_markup();
    assert!(iframe.contains(
        "sandbox=\"allow-downloads allow-forms allow-popups allow-same-origin allow-scripts \
         allow-top-navigation-by-user-activation\""
    ));
    assert!(handle.frame.request(&ContextAction::RunScript).is_ok());
    assert!(
        handle
            .frame
            .request(&ContextAction::NavigateTop {
                url: "https://example.com".into(),
                user_gesture: false,
            })
            .is_err()
    );
}

#[test]
fn archive_round_trip_preserves_files() {
    let files = project();
    let text = archive::export(&files).unwrap();
    let imported = archive::import(&text).unwrap();

    assert_eq!(imported.by_name(), files.by_name());
}

#[test]
fn rejected_import_leaves_state_untouched() {
    let store = ProjectStore::new(MemoryStore::new(), "playmap:files");
    store.save(&project()).unwrap();
    let before = store.backend().get("playmap:files").unwrap();

    let mut working = store.load();
    let result = store.import_archive(r#"{"files": {"9": {"name": "x.js", "value": ""}}, "playmap": {}}"#);

    match result {
        Ok(files) => working = files,
        Err(e) => assert!(matches!(e, ArchiveError::MissingVersion)),
    }

    assert_eq!(working, project());
    assert_eq!(store.backend().get("playmap:files").unwrap(), before);
}

#[tokio::test]
async fn listener_task_relays_in_background() {
    let runtime = Playmap::with_defaults().unwrap();
    let session = runtime.session();
    let handle = session.run(&project()).unwrap();

    let task = session.spawn_listener().unwrap();
    assert!(session.spawn_listener().is_none());

    handle.frame.post(log(handle.run(), "warn", "careful"));
    handle.frame.post(json!({"event": "NOPE"}));

    for _ in 0..100 {
        if session.relay().metrics().received == 2 {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }

    assert_eq!(session.entries()[0].method, LogMethod::Warn);
    assert_eq!(session.relay().metrics().rejected, 1);
    task.abort();
}
