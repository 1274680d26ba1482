//! Cross-context wire protocol.
//!
//! Contexts post plain JSON objects:
//!
//! ```text
//! { "event": "LOG",   "level": "log" | "warn" | "error", "args": [...], "run": 3 }
//! { "event": "ERROR", "level": "error",
//!   "args": [message, sourceLocator, line, column, errorObject], "run": 3 }
//! ```
//!
//! Messages are validated on receipt and decoded into [`ContextMessage`].
//! `run` is optional; untagged messages are accepted as current.

use std::fmt;

use playmap_core::RunId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use thiserror::Error;

/// `event` value of logging messages.
pub const EVENT_LOG: &str = "LOG";

/// `event` value of uncaught error messages.
pub const EVENT_ERROR: &str = "ERROR";

/// Severities intercepted inside the context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// `console.log`
    Log,
    /// `console.warn`
    Warn,
    /// `console.error`
    Error,
}

impl LogLevel {
    /// All intercepted levels.
    pub const ALL: [LogLevel; 3] = [LogLevel::Log, LogLevel::Warn, LogLevel::Error];

    /// Wire name of the level.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Log => "log",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    /// Parse a wire name.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "log" => Some(LogLevel::Log),
            "warn" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An uncaught error reported by a context.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorReport {
    /// Error message.
    pub message: String,
    /// Locator of the script that raised it.
    pub source: String,
    /// 1-based line, when reported.
    pub line: Option<u64>,
    /// 1-based column, when reported.
    pub column: Option<u64>,
    /// The serialized error object, `null` when absent.
    pub error: Value,
    /// Run the context was loaded for.
    pub run: Option<RunId>,
}

/// A decoded message from an execution context.
#[derive(Debug, Clone, PartialEq)]
pub enum ContextMessage {
    /// A console call.
    Log {
        /// Severity.
        level: LogLevel,
        /// Serialized arguments.
        args: Vec<Value>,
        /// Run the context was loaded for.
        run: Option<RunId>,
    },
    /// An uncaught error.
    Error(ErrorReport),
}

/// Why a message was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// The message is not a JSON object.
    #[error("Message is not an object")]
    NotAnObject,

    /// A required field is absent.
    #[error("Missing field '{0}'")]
    MissingField(&'static str),

    /// A field has the wrong shape.
    #[error("Field '{field}' must be {expected}")]
    InvalidField {
        /// Field name.
        field: &'static str,
        /// Expected shape.
        expected: &'static str,
    },

    /// `event` is not a known event.
    #[error("Unknown event '{0}'")]
    UnknownEvent(String),

    /// `level` is not a known level.
    #[error("Unknown log level '{0}'")]
    UnknownLevel(String),
}

impl ContextMessage {
    /// Validate and decode a raw message.
    pub fn decode(value: &Value) -> Result<Self, ProtocolError> {
        let object = value.as_object().ok_or(ProtocolError::NotAnObject)?;

        let event = object
            .get("event")
            .ok_or(ProtocolError::MissingField("event"))?
            .as_str()
            .ok_or(ProtocolError::InvalidField {
                field: "event",
                expected: "a string",
            })?;
        let run = decode_run(object)?;
        let args = object
            .get("args")
            .ok_or(ProtocolError::MissingField("args"))?
            .as_array()
            .ok_or(ProtocolError::InvalidField {
                field: "args",
                expected: "an array",
            })?;

        match event {
            EVENT_LOG => {
                let level = object
                    .get("level")
                    .ok_or(ProtocolError::MissingField("level"))?
                    .as_str()
                    .ok_or(ProtocolError::InvalidField {
                        field: "level",
                        expected: "a string",
                    })?;
                let level = LogLevel::parse(level)
                    .ok_or_else(|| ProtocolError::UnknownLevel(level.to_string()))?;

                Ok(ContextMessage::Log {
                    level,
                    args: args.clone(),
                    run,
                })
            }
            EVENT_ERROR => Ok(ContextMessage::Error(ErrorReport {
                message: args.first().map(value_text).unwrap_or_default(),
                source: args
                    .get(1)
                    .filter(|v| !v.is_null())
                    .map(value_text)
                    .unwrap_or_default(),
                line: args.get(2).and_then(position),
                column: args.get(3).and_then(position),
                error: args.get(4).cloned().unwrap_or(Value::Null),
                run,
            })),
            other => Err(ProtocolError::UnknownEvent(other.to_string())),
        }
    }

    /// Encode back to the wire shape.
    pub fn encode(&self) -> Value {
        let mut value = match self {
            ContextMessage::Log { level, args, .. } => json!({
                "event": EVENT_LOG,
                "level": level.as_str(),
                "args": args,
            }),
            ContextMessage::Error(report) => json!({
                "event": EVENT_ERROR,
                "level": LogLevel::Error.as_str(),
                "args": [
                    report.message,
                    report.source,
                    report.line,
                    report.column,
                    report.error,
                ],
            }),
        };
        if let (Some(run), Some(object)) = (self.run(), value.as_object_mut()) {
            object.insert("run".to_string(), json!(run.get()));
        }
        value
    }

    /// Run tag of the message.
    pub fn run(&self) -> Option<RunId> {
        match self {
            ContextMessage::Log { run, .. } => *run,
            ContextMessage::Error(report) => report.run,
        }
    }

    /// Wire event name.
    pub fn event(&self) -> &'static str {
        match self {
            ContextMessage::Log { .. } => EVENT_LOG,
            ContextMessage::Error(_) => EVENT_ERROR,
        }
    }
}

/// Text form of a serialized argument: strings as-is, anything else as JSON.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn decode_run(object: &Map<String, Value>) -> Result<Option<RunId>, ProtocolError> {
    match object.get("run") {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_u64()
            .map(|n| Some(RunId::new(n)))
            .ok_or(ProtocolError::InvalidField {
                field: "run",
                expected: "a non-negative integer",
            }),
    }
}

fn position(value: &Value) -> Option<u64> {
    value
        .as_u64()
        .or_else(|| value.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
}
