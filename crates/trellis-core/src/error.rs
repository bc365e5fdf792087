//! Error types for the planning library.

use std::path::PathBuf;

use thiserror::Error;

use crate::models::ItemId;

/// Comprehensive error type for all planning operations.
#[derive(Error, Debug)]
pub enum PlanningError {
    /// A gesture was rejected before anything was persisted
    #[error("{message}")]
    Validation { message: String },
    /// The proposed predecessor edge would close a dependency loop
    #[error("Linking {predecessor} before {successor} would create a circular dependency")]
    CircularDependency {
        successor: ItemId,
        predecessor: ItemId,
    },
    /// Plan item not found for the given ID
    #[error("Item with ID {id} not found")]
    ItemNotFound { id: ItemId },
    /// Project not found for the given ID
    #[error("Project with ID {id} not found")]
    ProjectNotFound { id: u64 },
    /// Invalid input validation errors
    #[error("Invalid input for field '{field}': {reason}")]
    InvalidInput { field: String, reason: String },
    /// Database connection or query errors
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: rusqlite::Error,
    },
    /// Failures reported by a persistence collaborator without a richer source
    #[error("Persistence error: {message}")]
    Persistence { message: String },
    /// File system operation errors
    #[error("File system error at path '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        source: std::io::Error,
    },
    /// XDG directory specification errors
    #[error("XDG directory error: {0}")]
    XdgDirectory(String),
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

/// Builder for creating database errors with optional context.
pub struct DatabaseErrorBuilder {
    message: String,
}

impl DatabaseErrorBuilder {
    /// Create a new database error builder with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Build the error with the given source.
    pub fn with_source(self, source: rusqlite::Error) -> PlanningError {
        PlanningError::Database {
            message: self.message,
            source,
        }
    }
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
    pub fn with_reason(self, reason: impl Into<String>) -> PlanningError {
        PlanningError::InvalidInput {
            field: self.field,
            reason: reason.into(),
        }
    }
}

impl PlanningError {
    /// Creates a builder for database errors.
    pub fn database(message: impl Into<String>) -> DatabaseErrorBuilder {
        DatabaseErrorBuilder::new(message)
    }

    /// Creates a builder for input validation errors.
    pub fn invalid_input(field: impl Into<String>) -> InvalidInputBuilder {
        InvalidInputBuilder::new(field)
    }

    /// Creates a user-facing validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        PlanningError::Validation {
            message: message.into(),
        }
    }

    /// Whether the error was raised before any persistence call was made.
    ///
    /// Validation failures leave every store untouched; everything else may
    /// have left the local snapshot out of date and warrants a re-fetch.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            PlanningError::Validation { .. }
                | PlanningError::CircularDependency { .. }
                | PlanningError::InvalidInput { .. }
        )
    }
}

/// Specialized extension trait for database-related Results.
pub trait DatabaseResultExt<T> {
    /// Map database errors with a message.
    fn db_context(self, message: &str) -> Result<T>;
}

impl<T> DatabaseResultExt<T> for std::result::Result<T, rusqlite::Error> {
    fn db_context(self, message: &str) -> Result<T> {
        self.map_err(|e| PlanningError::database(message).with_source(e))
    }
}

/// Extension trait mapping task join failures from `spawn_blocking`.
pub trait JoinResultExt<T> {
    /// Convert a join error into a configuration error.
    fn join_context(self) -> Result<T>;
}

impl<T> JoinResultExt<T> for std::result::Result<T, tokio::task::JoinError> {
    fn join_context(self) -> Result<T> {
        self.map_err(|e| PlanningError::Configuration {
            message: format!("Task join error: {e}"),
        })
    }
}

/// Result type alias for planning operations
pub type Result<T> = std::result::Result<T, PlanningError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_are_classified() {
        assert!(PlanningError::validation("No previous sibling to become parent.").is_validation());
        assert!(PlanningError::invalid_input("progress")
            .with_reason("must be between 0 and 100")
            .is_validation());
        assert!(!PlanningError::Persistence {
            message: "connection reset".into()
        }
        .is_validation());
    }

    #[test]
    fn test_validation_message_is_verbatim() {
        let err = PlanningError::validation("Components can only be pasted at root level.");
        assert_eq!(err.to_string(), "Components can only be pasted at root level.");
    }

    #[test]
    fn test_database_context_wraps_source() {
        let result: std::result::Result<(), rusqlite::Error> =
            Err(rusqlite::Error::QueryReturnedNoRows);
        let err = result.db_context("Failed to load item").unwrap_err();
        assert_eq!(err.to_string(), "Database error: Failed to load item");
    }
}
