//! Storage error types.

use rusqlite::ErrorCode;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The requested entity was not found.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A record failed validation before reaching the backend.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// A persisted value could not be decoded.
    #[error("corrupt {column} value {value:?}: {reason}")]
    Corrupt {
        column: String,
        value: String,
        reason: String,
    },

    /// The database is locked by another process.
    #[error("database locked: {0}")]
    DatabaseLocked(String),

    /// Failed to establish or maintain a database connection.
    #[error("connection error: {0}")]
    Connection(String),

    /// A transaction operation failed.
    #[error("transaction error: {0}")]
    Transaction(String),

    /// Schema initialisation failed.
    #[error("migration {name} failed: {reason}")]
    Migration { name: String, reason: String },

    /// A raw SQLite query error.
    #[error("query error: {0}")]
    Query(#[from] rusqlite::Error),
}

/// Convenience alias used throughout the storage crate.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Every store rejects records that lack a run or a step id.
pub(crate) fn require_ids(record: &str, run_id: &str, step_id: &str) -> Result<()> {
    if run_id.is_empty() || step_id.is_empty() {
        return Err(StorageError::validation(format!(
            "{record} needs a run and a step id (got {run_id:?}/{step_id:?})"
        )));
    }
    Ok(())
}

impl StorageError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` if the error is transient and the operation may succeed
    /// on retry (busy or locked database, lost connection).
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::DatabaseLocked(_) | Self::Connection(_) | Self::Transaction(_) => true,
            Self::Query(rusqlite::Error::SqliteFailure(err, _)) => matches!(
                err.code,
                ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked
            ),
            _ => false,
        }
    }
}
