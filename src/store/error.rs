//! Unified error types for storage operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    // ========================================================================
    // SQLite backend errors
    // ========================================================================
    /// A statement failed to prepare, bind, execute or decode.
    #[error("{operation} failed: {source}")]
    Sqlite {
        operation: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    /// I/O error while preparing the database location.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The shared connection mutex was poisoned by a panicking holder.
    #[error("database connection lock poisoned")]
    LockPoisoned,

    /// The blocking task running a statement did not complete.
    #[error("storage task failed: {0}")]
    Task(String),

    // ========================================================================
    // Generic errors (any backend)
    // ========================================================================
    /// Entity not found.
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },
}

impl StorageError {
    /// Wrap a driver error with the name of the operation that produced it.
    pub fn sqlite(operation: &'static str, source: rusqlite::Error) -> Self {
        Self::Sqlite { operation, source }
    }

    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a not found error.
    pub fn not_found(entity_type: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type,
            id: id.to_string(),
        }
    }

    /// True when the error signals a missing entity rather than a failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<tokio::task::JoinError> for StorageError {
    fn from(e: tokio::task::JoinError) -> Self {
        Self::Task(e.to_string())
    }
}

/// Convenience type alias for storage results.
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display() {
        let err = StorageError::not_found("student", 42);
        assert_eq!(err.to_string(), "student not found: 42");
        assert!(err.is_not_found());
    }

    #[test]
    fn sqlite_error_carries_operation() {
        let err = StorageError::sqlite("create student", rusqlite::Error::InvalidQuery);
        assert!(err.to_string().starts_with("create student failed"));
        assert!(!err.is_not_found());
    }
}
