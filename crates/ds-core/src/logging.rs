//! Injectable logging interface.
//!
//! Components take a [`SharedLogger`] at construction instead of reaching for a
//! global. The binary builds one [`TracingLogger`] and hands clones of it around.

use std::sync::Arc;
use std::sync::Mutex;

/// Severity of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Sink for component log output.
pub trait Logger: Send + Sync {
    fn log(&self, level: LogLevel, component: &'static str, message: &str);

    fn debug(&self, component: &'static str, message: &str) {
        self.log(LogLevel::Debug, component, message);
    }

    fn info(&self, component: &'static str, message: &str) {
        self.log(LogLevel::Info, component, message);
    }

    fn warn(&self, component: &'static str, message: &str) {
        self.log(LogLevel::Warn, component, message);
    }

    fn error(&self, component: &'static str, message: &str) {
        self.log(LogLevel::Error, component, message);
    }
}

/// Reference-counted logger handle passed to every component.
pub type SharedLogger = Arc<dyn Logger>;

/// Forwards entries to the `tracing` dispatcher.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, level: LogLevel, component: &'static str, message: &str) {
        match level {
            LogLevel::Debug => tracing::debug!(component, "{message}"),
            LogLevel::Info => tracing::info!(component, "{message}"),
            LogLevel::Warn => tracing::warn!(component, "{message}"),
            LogLevel::Error => tracing::error!(component, "{message}"),
        }
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLogger;

impl Logger for NullLogger {
    fn log(&self, _level: LogLevel, _component: &'static str, _message: &str) {}
}

/// One captured entry of a [`MemoryLogger`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: LogLevel,
    pub component: &'static str,
    pub message: String,
}

/// Keeps entries in memory so callers can inspect what was logged.
#[derive(Debug, Default)]
pub struct MemoryLogger {
    entries: Mutex<Vec<LogEntry>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        match self.entries.lock() {
            Ok(entries) => entries.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn contains(&self, level: LogLevel, needle: &str) -> bool {
        self.entries()
            .iter()
            .any(|entry| entry.level == level && entry.message.contains(needle))
    }
}

impl Logger for MemoryLogger {
    fn log(&self, level: LogLevel, component: &'static str, message: &str) {
        let entry = LogEntry {
            level,
            component,
            message: message.to_owned(),
        };
        match self.entries.lock() {
            Ok(mut entries) => entries.push(entry),
            Err(poisoned) => poisoned.into_inner().push(entry),
        }
    }
}

/// Process-wide default: a tracing-backed logger.
pub fn default_logger() -> SharedLogger {
    Arc::new(TracingLogger)
}
