//! # Database Error Types
//!
//! Error types for database and store operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)          ValidationError (catalog-core)    │
//! │       │                                     │                           │
//! │       ▼                                     │                           │
//! │  DbError (this module)                      │                           │
//! │       │                                     │                           │
//! │       ▼                                     ▼                           │
//! │  StoreError ◄──── AddressUnresolved ── every Store operation           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Caller treats any StoreError as "Rejected", shows a generic message   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use catalog_core::ValidationError;
use thiserror::Error;

/// Database operation errors.
///
/// These errors wrap sqlx errors and provide additional context
/// for debugging and user feedback.
#[derive(Debug, Error)]
pub enum DbError {
    /// A table constraint refused the statement.
    ///
    /// ## When This Occurs
    /// - NOT NULL column written as null through a filter-wide update
    /// - Any UNIQUE / CHECK violation
    #[error("Constraint violation: {message}")]
    ConstraintViolation { message: String },

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file doesn't exist and can't be created
    /// - File permissions issue
    /// - Disk full
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Schema creation or version check failed.
    ///
    /// ## When This Occurs
    /// - Database file carries a newer schema version
    /// - Existing table layout does not match the configured revision
    #[error("Schema setup failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    ///
    /// ## When This Occurs
    /// - Caller-supplied filter or sort order is not valid SQL
    /// - Wrong number of filter arguments
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// sqlx::Error::PoolClosed     → DbError::ConnectionFailed
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // SQLite reports constraint failures as
                // "<KIND> constraint failed: <table>.<column>"
                if msg.contains("constraint failed") {
                    DbError::ConstraintViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Store Error
// =============================================================================

/// Why a [`crate::ProductStore`] operation was rejected.
///
/// Every variant means the same thing to a caller: the operation did not
/// happen and retrying it unchanged will not help. The variants exist so
/// that logs and tests can tell bad input from a broken store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The address is neither the collection nor an item address.
    #[error("Unknown address: {0}")]
    AddressUnresolved(String),

    /// A present field failed its type/range check, a required field was
    /// missing, or an unknown column was named.
    #[error("Invalid field set: {0}")]
    Validation(#[from] ValidationError),

    /// The embedded store failed the statement.
    #[error("Storage failure: {0}")]
    Storage(#[from] DbError),
}

impl StoreError {
    /// True when the caller's input caused the rejection.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            StoreError::AddressUnresolved(_) | StoreError::Validation(_)
        )
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Storage(err.into())
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
