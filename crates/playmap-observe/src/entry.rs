//! Log entries produced by the relay.

use std::fmt;

use playmap_core::RunId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::protocol::{LogLevel, value_text};

/// Kind of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogMethod {
    /// `console.log`
    Log,
    /// `console.warn`
    Warn,
    /// `console.error`
    Error,
    /// An uncaught script error, attributed to a file.
    ScriptErr,
}

impl LogMethod {
    /// Wire name of the method.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogMethod::Log => "log",
            LogMethod::Warn => "warn",
            LogMethod::Error => "error",
            LogMethod::ScriptErr => "script_err",
        }
    }

    /// Whether the entry reports a problem.
    pub fn is_error(&self) -> bool {
        matches!(self, LogMethod::Error | LogMethod::ScriptErr)
    }
}

impl From<LogLevel> for LogMethod {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Log => LogMethod::Log,
            LogLevel::Warn => LogMethod::Warn,
            LogLevel::Error => LogMethod::Error,
        }
    }
}

impl fmt::Display for LogMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of the log feed. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Entry kind.
    pub method: LogMethod,
    /// Entry payload.
    pub data: Vec<Value>,
    /// Run the entry belongs to, when the message carried one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run: Option<RunId>,
}

impl LogEntry {
    /// Entry for a console call.
    pub fn console(level: LogLevel, args: Vec<Value>, run: Option<RunId>) -> Self {
        Self {
            method: level.into(),
            data: args,
            run,
        }
    }

    /// Entry for an uncaught error: `(Line <line> <file>) <message>`.
    pub fn script_error(
        file: &str,
        line: Option<u64>,
        message: &str,
        run: Option<RunId>,
    ) -> Self {
        let line = line.map_or_else(|| "?".to_string(), |l| l.to_string());
        Self {
            method: LogMethod::ScriptErr,
            data: vec![Value::String(format!("(Line {line} {file}) {message}"))],
            run,
        }
    }

    /// Payload joined with spaces.
    pub fn render(&self) -> String {
        self.data
            .iter()
            .map(value_text)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.method, self.render())
    }
}
