//! Logging shim injected into every assembled document.
//!
//! The shim wraps `console.log`, `console.warn` and `console.error` and
//! installs `window.onerror`. Each call still reaches the original console
//! and is then posted to the parent as a protocol message tagged with the
//! run id. Arguments are serialized in the context: elements as their
//! markup, other objects as indented JSON, everything else as text.

use playmap_core::RunId;
use playmap_core::markup::script_element;
use playmap_core::MarkupResult;

use crate::protocol::{EVENT_ERROR, EVENT_LOG, LogLevel};

/// Attribute marking the shim's script element.
pub const SHIM_MARKER: (&str, &str) = ("data-playmap", "console");

const TEMPLATE: &str = r#"(function () {
  var RUN = __RUN__;
  var LEVELS = __LEVELS__;
  function serialize(value) {
    if (typeof Element !== "undefined" && value instanceof Element) {
      return value.outerHTML;
    }
    if (value !== null && typeof value === "object") {
      try {
        return JSON.stringify(value, null, 2);
      } catch (e) {
        return String(value);
      }
    }
    return String(value);
  }
  function post(message) {
    message.run = RUN;
    try {
      window.parent.postMessage(message, "*");
    } catch (e) {}
  }
  LEVELS.forEach(function (level) {
    var original = console[level];
    console[level] = function () {
      var args = Array.prototype.slice.call(arguments);
      if (original) {
        original.apply(console, args);
      }
      post({ event: "__EVENT_LOG__", level: level, args: args.map(serialize) });
    };
  });
  window.onerror = function (message, source, line, column, error) {
    var detail = null;
    if (error) {
      detail = { name: error.name, message: error.message, stack: error.stack || null };
    }
    post({
      event: "__EVENT_ERROR__",
      level: "error",
      args: [String(message), source || null, line, column, detail]
    });
  };
})();"#;

/// Generator for the shim source of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoggingShim {
    run: RunId,
}

impl LoggingShim {
    /// Shim tagging messages with `run`.
    pub fn new(run: RunId) -> Self {
        Self { run }
    }

    /// The run the shim reports for.
    pub fn run(&self) -> RunId {
        self.run
    }

    /// Script source.
    pub fn source(&self) -> String {
        let levels = LogLevel::ALL
            .iter()
            .map(|level| format!("\"{}\"", level.as_str()))
            .collect::<Vec<_>>()
            .join(", ");

        TEMPLATE
            .replace("__RUN__", &self.run.get().to_string())
            .replace("__LEVELS__", &format!("[{levels}]"))
            .replace("__EVENT_LOG__", EVENT_LOG)
            .replace("__EVENT_ERROR__", EVENT_ERROR)
    }

    /// The shim as an inline script element.
    pub fn script_element(&self) -> MarkupResult<String> {
        script_element(&[SHIM_MARKER], &self.source())
    }
}
