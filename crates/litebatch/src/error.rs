//! Error types for litebatch

use rusqlite::ffi;
use thiserror::Error;

/// Result type alias for litebatch operations
pub type BatchResult<T> = Result<T, BatchError>;

/// Error types for statement construction and execution
#[derive(Debug, Error)]
pub enum BatchError {
    /// Query execution error
    #[error("Query error: {0}")]
    Query(#[from] rusqlite::Error),

    /// Unique or primary key constraint violation
    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    /// Foreign key constraint violation
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// Check constraint violation
    #[error("Check constraint violation: {0}")]
    CheckViolation(String),

    /// NOT NULL constraint violation
    #[error("Not null violation: {0}")]
    NotNullViolation(String),

    /// Statement construction error (missing key, row width mismatch, ...)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Batch encoding/decoding error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Execution vetoed by a query hook
    #[error("Query aborted: {0}")]
    Aborted(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl BatchError {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization(message.into())
    }

    /// Check if this is a unique violation error
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueViolation(_))
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Classify a rusqlite error by its extended result code.
    ///
    /// Constraint failures become the matching violation variant; everything
    /// else is returned as [`BatchError::Query`] untouched.
    pub fn from_db_error(err: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(ref failure, ref message) = err {
            if failure.code == rusqlite::ErrorCode::ConstraintViolation {
                let message = message
                    .clone()
                    .unwrap_or_else(|| failure.to_string());
                match failure.extended_code {
                    ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                        return Self::UniqueViolation(message);
                    }
                    ffi::SQLITE_CONSTRAINT_FOREIGNKEY => {
                        return Self::ForeignKeyViolation(message);
                    }
                    ffi::SQLITE_CONSTRAINT_CHECK => return Self::CheckViolation(message),
                    ffi::SQLITE_CONSTRAINT_NOTNULL => return Self::NotNullViolation(message),
                    _ => {}
                }
            }
        }
        Self::Query(err)
    }
}

impl From<serde_json::Error> for BatchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
