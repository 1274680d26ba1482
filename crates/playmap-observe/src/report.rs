//! Run reports.

use playmap_core::RunId;
use serde::{Deserialize, Serialize};

use crate::entry::{LogEntry, LogMethod};
use crate::metrics::MetricsSnapshot;

/// The log feed of one run together with the relay counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// The run observed, if one was active.
    pub run: Option<RunId>,
    /// Entries, newest first.
    pub entries: Vec<LogEntry>,
    /// Relay counters.
    pub metrics: MetricsSnapshot,
}

impl RunReport {
    /// Create a new run report.
    pub fn new(run: Option<RunId>, entries: Vec<LogEntry>, metrics: MetricsSnapshot) -> Self {
        Self {
            run,
            entries,
            metrics,
        }
    }

    /// Number of entries reporting a problem.
    pub fn error_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.method.is_error())
            .count()
    }

    /// Check whether the run logged no errors.
    pub fn is_clean(&self) -> bool {
        self.error_count() == 0
    }

    /// Format as human-readable text.
    pub fn to_text(&self) -> String {
        let mut output = String::new();

        match self.run {
            Some(run) => output.push_str(&format!("Run Report: {run}\n")),
            None => output.push_str("Run Report: (no active run)\n"),
        }
        output.push('\n');

        if self.entries.is_empty() {
            output.push_str("No log entries\n");
        } else {
            output.push_str("Log (newest first):\n");
            for entry in &self.entries {
                let label = match entry.method {
                    LogMethod::Log => "LOG",
                    LogMethod::Warn => "WARN",
                    LogMethod::Error => "ERROR",
                    LogMethod::ScriptErr => "SCRIPT",
                };
                output.push_str(&format!("  [{label}] {}\n", entry.render()));
            }
        }

        output.push('\n');
        output.push_str("Relay:\n");
        output.push_str(&format!("  Received: {}\n", self.metrics.received));
        output.push_str(&format!("  Appended: {}\n", self.metrics.appended));
        output.push_str(&format!("  Rejected: {}\n", self.metrics.rejected));
        output.push_str(&format!("  Stale: {}\n", self.metrics.stale));
        if self.metrics.evicted > 0 {
            output.push_str(&format!("  Evicted: {}\n", self.metrics.evicted));
        }

        output
    }

    /// Format as JSON.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    /// Format as pretty JSON string.
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}
