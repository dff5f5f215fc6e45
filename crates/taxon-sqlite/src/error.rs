//! Error types for SQLite storage

use taxon_core::StorageError;
use thiserror::Error;

/// SQLite storage error type
#[derive(Error, Debug)]
pub enum SqliteError {
    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query execution error
    #[error("Query error: {0}")]
    Query(String),

    /// Schema/migration error
    #[error("Schema error: {0}")]
    Schema(String),

    /// Class or field not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Class name already taken
    #[error("Name already in use: {0}")]
    Conflict(String),

    /// Invalid operation
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Underlying rusqlite error
    #[error("SQLite error: {0}")]
    Rusqlite(#[from] rusqlite::Error),
}

/// Result type for SQLite operations
pub type SqliteResult<T> = Result<T, SqliteError>;

impl From<SqliteError> for StorageError {
    fn from(err: SqliteError) -> Self {
        match err {
            SqliteError::Connection(msg) => Self::Connection(msg),
            SqliteError::Query(msg) => Self::Query(msg),
            SqliteError::Schema(msg) => Self::Schema(msg),
            SqliteError::NotFound(msg) => Self::NotFound(msg),
            SqliteError::Conflict(msg) => Self::Conflict(msg),
            SqliteError::InvalidOperation(msg) => Self::InvalidOperation(msg),
            SqliteError::Rusqlite(e) => Self::Backend(e.to_string()),
        }
    }
}
