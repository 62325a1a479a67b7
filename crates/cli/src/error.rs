//! Error types for CLI operations.

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// A line (or array element) of the event file is not a notification
    #[error("Invalid event at line {line}: {message}")]
    EventParse { line: usize, message: String },

    /// The event parsed but failed field validation
    #[error("Event at line {line} failed validation: {message}")]
    EventValidation { line: usize, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub fn event_parse(line: usize, message: impl Into<String>) -> Self {
        Self::EventParse {
            line,
            message: message.into(),
        }
    }

    pub fn event_validation(line: usize, message: impl Into<String>) -> Self {
        Self::EventValidation {
            line,
            message: message.into(),
        }
    }
}

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
