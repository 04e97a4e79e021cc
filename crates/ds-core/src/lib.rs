//! Shared primitives used across DOMspy crates.

use core::fmt;

mod logging;

pub use logging::LogEntry;
pub use logging::LogLevel;
pub use logging::Logger;
pub use logging::MemoryLogger;
pub use logging::NullLogger;
pub use logging::SharedLogger;
pub use logging::TracingLogger;
pub use logging::default_logger;

/// Result alias used across the workspace.
pub type DomspyResult<T> = Result<T, DomspyError>;

/// Error carried between crates; `code` is a stable dotted identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomspyError {
    pub code: &'static str,
    pub message: String,
}

impl DomspyError {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for DomspyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for DomspyError {}
