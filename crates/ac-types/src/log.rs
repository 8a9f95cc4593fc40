//! # Structured Logs
//!
//! Every stage returns `(Vec<Log>, NewState)` instead of calling a logger
//! directly, so the coordinator can concatenate a single ordered log
//! stream for the run while also emitting
//! through `tracing` at the call site for live observability.

use serde::{Deserialize, Serialize};

/// Log severity: `DEBUG|INFO|WARN|ERROR`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    /// Routine, high-volume detail (e.g. "request already fulfilled").
    Debug,
    /// Run-level milestones.
    Info,
    /// Recoverable anomaly; the run continues.
    Warn,
    /// A request or provider could not be processed.
    Error,
}

/// One structured log record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Log {
    /// Severity.
    pub level: LogLevel,
    /// Human-readable message.
    pub message: String,
    /// Optional attached error detail.
    pub error: Option<String>,
}

impl Log {
    /// Build a `DEBUG` log with no attached error.
    pub fn debug(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Debug, message: message.into(), error: None }
    }

    /// Build an `INFO` log with no attached error.
    pub fn info(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Info, message: message.into(), error: None }
    }

    /// Build a `WARN` log with no attached error.
    pub fn warn(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Warn, message: message.into(), error: None }
    }

    /// Build an `ERROR` log, optionally carrying the triggering error's
    /// display string.
    pub fn error(message: impl Into<String>, error: Option<String>) -> Self {
        Self { level: LogLevel::Error, message: message.into(), error }
    }

    /// Mirror this record through `tracing` at the matching level, in
    /// addition to it being returned in the stage's log list.
    pub fn emit(&self) {
        match self.level {
            LogLevel::Debug => tracing::debug!(error = ?self.error, "{}", self.message),
            LogLevel::Info => tracing::info!(error = ?self.error, "{}", self.message),
            LogLevel::Warn => tracing::warn!(error = ?self.error, "{}", self.message),
            LogLevel::Error => tracing::error!(error = ?self.error, "{}", self.message),
        }
    }
}
