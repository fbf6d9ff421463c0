//! Storage error types.

use derive_more::{Display, Error};
use tracing::instrument;

/// Storage failure with the location that raised it.
#[derive(Debug, Clone, Display, Error)]
#[display("Storage error: {} at {}:{}", message, file, line)]
pub struct DbError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl DbError {
    /// Creates a new storage error, recording the caller's location.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// Creates an error for a stored value that violates a column invariant.
    #[track_caller]
    pub fn corrupt(table: &str, id: i32, detail: impl std::fmt::Display) -> Self {
        Self::new(format!("Corrupt row {}#{}: {}", table, id, detail))
    }
}

impl From<diesel::result::Error> for DbError {
    #[track_caller]
    fn from(err: diesel::result::Error) -> Self {
        Self::new(format!("Diesel error: {}", err))
    }
}

impl From<diesel::ConnectionError> for DbError {
    #[track_caller]
    fn from(err: diesel::ConnectionError) -> Self {
        Self::new(format!("Connection error: {}", err))
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for DbError {
    #[track_caller]
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        Self::new(format!("Migration error: {}", err))
    }
}
