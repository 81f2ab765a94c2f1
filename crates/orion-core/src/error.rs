//! Error types for the orchestration library.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Comprehensive error type for all orchestration operations.
///
/// Recoverable conditions of the execution and delivery paths (a failing
/// tool, an unreachable webhook, an unusable oracle reply) are not errors at
/// this level: they surface as step updates, fan-out reports or fallback
/// plans. This enum covers storage, configuration and input problems.
#[derive(Error, Debug)]
pub enum OrionError {
    /// Database connection or query errors
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: rusqlite::Error,
    },
    /// Plan not found for the given ID
    #[error("Plan with ID {id} not found")]
    PlanNotFound { id: String },
    /// A plan with the same ID is already stored
    #[error("Plan with ID {id} already exists")]
    DuplicatePlan { id: String },
    /// File system operation errors
    #[error("File system error at path '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        source: std::io::Error,
    },
    /// XDG directory specification errors
    #[error("XDG directory error: {0}")]
    XdgDirectory(String),
    /// Invalid input validation errors
    #[error("Invalid input for field '{field}': {reason}")]
    InvalidInput { field: String, reason: String },
    /// Serialization/deserialization errors
    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

/// Builder for creating input validation errors.
pub struct InvalidInputBuilder {
    field: String,
}

impl InvalidInputBuilder {
    /// Create a new invalid input error builder for a field.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }

    /// Build the error with the given reason.
    pub fn with_reason(self, reason: impl Into<String>) -> OrionError {
        OrionError::InvalidInput {
            field: self.field,
            reason: reason.into(),
        }
    }
}

impl OrionError {
    /// Creates a builder for input validation errors.
    pub fn invalid_input(field: impl Into<String>) -> InvalidInputBuilder {
        InvalidInputBuilder::new(field)
    }

    /// Creates a configuration error from any displayable message.
    pub fn configuration(message: impl fmt::Display) -> Self {
        Self::Configuration {
            message: message.to_string(),
        }
    }
}

/// Attaches the failed operation to SQLite errors.
pub trait DatabaseResultExt<T> {
    fn db_context(self, operation: &str) -> Result<T>;
}

impl<T> DatabaseResultExt<T> for std::result::Result<T, rusqlite::Error> {
    fn db_context(self, operation: &str) -> Result<T> {
        self.map_err(|source| OrionError::Database {
            message: operation.to_string(),
            source,
        })
    }
}

/// Result type alias for orchestration operations
pub type Result<T> = std::result::Result<T, OrionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_builder() {
        let err = OrionError::invalid_input("steps").with_reason("must not be empty");
        assert_eq!(
            err.to_string(),
            "Invalid input for field 'steps': must not be empty"
        );
    }

    #[test]
    fn test_db_context_keeps_operation_and_source() {
        let failed: std::result::Result<(), rusqlite::Error> =
            Err(rusqlite::Error::QueryReturnedNoRows);
        let err = failed.db_context("Failed to load plan").unwrap_err();

        assert_eq!(err.to_string(), "Database error: Failed to load plan");
        assert!(matches!(
            err,
            OrionError::Database {
                source: rusqlite::Error::QueryReturnedNoRows,
                ..
            }
        ));
    }
}
