//! # Error Types
//!
//! Domain-specific error types for catalog-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  catalog-core errors (this file)                                       │
//! │  ├── CoreError        - Address parsing errors                         │
//! │  └── ValidationError  - Field-set validation failures                  │
//! │                                                                         │
//! │  catalog-db errors (separate crate)                                    │
//! │  ├── DbError          - Database operation failures                    │
//! │  └── StoreError       - What callers of ProductStore see               │
//! │                                                                         │
//! │  Flow: ValidationError → StoreError::Validation → caller ("Rejected")  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::contract::ColumnType;

// =============================================================================
// Core Error
// =============================================================================

/// Core domain errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The text could not be parsed as an address at all.
    #[error("Invalid address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },
}

// =============================================================================
// Validation Error
// =============================================================================

/// Field-set validation errors.
///
/// The first failing column aborts the whole write, so a single error is
/// always enough to describe why a field set was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The column does not exist in the schema, or is not writable (`id`).
    #[error("Unknown column: {column}")]
    UnknownColumn { column: String },

    /// An insert omitted a column every new row must carry.
    #[error("{column} is required")]
    Required { column: String },

    /// The value has the wrong variant for the column.
    #[error("{column} must be {expected}")]
    WrongType { column: String, expected: ColumnType },

    /// A NOT NULL column was given null.
    #[error("{column} cannot be null")]
    NullNotAllowed { column: String },

    /// Text column that must not be empty.
    #[error("{column} cannot be empty")]
    Empty { column: String },

    /// Integer column that must be zero or more.
    #[error("{column} cannot be negative (got {value})")]
    Negative { column: String, value: i64 },
}

impl ValidationError {
    /// Returns the column the error is about.
    pub fn column(&self) -> &str {
        match self {
            ValidationError::UnknownColumn { column }
            | ValidationError::Required { column }
            | ValidationError::WrongType { column, .. }
            | ValidationError::NullNotAllowed { column }
            | ValidationError::Empty { column }
            | ValidationError::Negative { column, .. } => column,
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            column: "supplier".to_string(),
        };
        assert_eq!(err.to_string(), "supplier is required");

        let err = ValidationError::Negative {
            column: "price".to_string(),
            value: -23,
        };
        assert_eq!(err.to_string(), "price cannot be negative (got -23)");

        let err = ValidationError::WrongType {
            column: "picture".to_string(),
            expected: ColumnType::Blob,
        };
        assert_eq!(err.to_string(), "picture must be a blob");
    }

    #[test]
    fn test_column_accessor() {
        let err = ValidationError::Empty {
            column: "name".to_string(),
        };
        assert_eq!(err.column(), "name");
    }

    #[test]
    fn test_invalid_address_message() {
        let err = CoreError::InvalidAddress {
            address: "not a uri".to_string(),
            reason: "relative URL without a base".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid address 'not a uri': relative URL without a base"
        );
    }
}
