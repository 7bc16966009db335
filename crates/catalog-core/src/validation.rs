//! # Validation Module
//!
//! Field-set validation for the products table.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: UI text watchers (external)                                  │
//! │  ├── Phone / email / price format while typing                         │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: ProductStore                                                 │
//! │  └── THIS MODULE: type + range check per present column                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  └── NOT NULL constraints                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rules
//! | column   | valid iff                                   |
//! |----------|---------------------------------------------|
//! | name     | text, non-empty                             |
//! | price    | integer, `>= 0`                             |
//! | quantity | integer, `>= 0`                             |
//! | supplier | text, non-empty                             |
//! | picture  | null or blob                                |
//! | supplier_phone_number, supplier_email, picture_path | null or text |
//!
//! All of these come from the [`ColumnSpec`] table; there is no per-column
//! branch in this file.

use crate::contract::{ColumnSpec, ColumnType, Constraint, ProductSchema};
use crate::error::ValidationError;
use crate::value::{FieldSet, Value};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Which write a field set is destined for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Every schema column must be present, and nothing else.
    Insert,
    /// Any subset of schema columns.
    Update,
}

/// Validates a whole field set against `schema`.
///
/// Returns the first failure. Nothing is written by the caller unless this
/// returns `Ok`.
///
/// ## Example
/// ```rust
/// use catalog_core::contract::SchemaRevision;
/// use catalog_core::validation::{validate_field_set, WriteMode};
/// use catalog_core::value::FieldSet;
///
/// let schema = SchemaRevision::Picture.schema();
///
/// let patch = FieldSet::new().with("quantity", 4);
/// assert!(validate_field_set(schema, &patch, WriteMode::Update).is_ok());
///
/// // A partial field set is never a valid insert.
/// assert!(validate_field_set(schema, &patch, WriteMode::Insert).is_err());
/// ```
pub fn validate_field_set(
    schema: &ProductSchema,
    fields: &FieldSet,
    mode: WriteMode,
) -> ValidationResult<()> {
    if mode == WriteMode::Insert {
        if let Some(missing) = schema.columns.iter().find(|c| !fields.contains(c.name)) {
            return Err(ValidationError::Required {
                column: missing.name.to_string(),
            });
        }
    }

    for (column, value) in fields.iter() {
        let spec = schema
            .column(column)
            .ok_or_else(|| ValidationError::UnknownColumn {
                column: column.to_string(),
            })?;
        validate_value(spec, value)?;
    }

    Ok(())
}

/// Checks one present value against its column spec.
pub fn validate_value(spec: &ColumnSpec, value: &Value) -> ValidationResult<()> {
    if value.is_null() {
        return if spec.nullable {
            Ok(())
        } else {
            Err(ValidationError::NullNotAllowed {
                column: spec.name.to_string(),
            })
        };
    }

    let type_matches = matches!(
        (spec.column_type, value),
        (ColumnType::Integer, Value::Integer(_))
            | (ColumnType::Text, Value::Text(_))
            | (ColumnType::Blob, Value::Blob(_))
    );
    if !type_matches {
        return Err(ValidationError::WrongType {
            column: spec.name.to_string(),
            expected: spec.column_type,
        });
    }

    match (spec.constraint, value) {
        (Constraint::NonEmpty, Value::Text(text)) if text.is_empty() => {
            Err(ValidationError::Empty {
                column: spec.name.to_string(),
            })
        }
        (Constraint::NonNegative, Value::Integer(n)) if *n < 0 => Err(ValidationError::Negative {
            column: spec.name.to_string(),
            value: *n,
        }),
        _ => Ok(()),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::SchemaRevision;

    fn schema() -> &'static ProductSchema {
        SchemaRevision::Picture.schema()
    }

    fn red_shirt() -> FieldSet {
        FieldSet::new()
            .with("name", "Red T-Shirt")
            .with("price", 1000)
            .with("quantity", 10)
            .with("supplier", "Garment District")
            .with("picture", vec![0u8, 1, 2, 3])
    }

    #[test]
    fn test_full_insert_is_valid() {
        assert!(validate_field_set(schema(), &red_shirt(), WriteMode::Insert).is_ok());

        let mut without_picture = red_shirt();
        without_picture.put("picture", Value::Null);
        assert!(validate_field_set(schema(), &without_picture, WriteMode::Insert).is_ok());
    }

    #[test]
    fn test_insert_missing_field() {
        for column in ["name", "price", "quantity", "supplier", "picture"] {
            let mut fields = red_shirt();
            fields.remove(column);
            assert_eq!(
                validate_field_set(schema(), &fields, WriteMode::Insert),
                Err(ValidationError::Required {
                    column: column.to_string()
                })
            );
        }
    }

    #[test]
    fn test_insert_extra_field() {
        let fields = red_shirt().with("colour", "red");
        assert_eq!(
            validate_field_set(schema(), &fields, WriteMode::Insert),
            Err(ValidationError::UnknownColumn {
                column: "colour".to_string()
            })
        );
    }

    #[test]
    fn test_id_is_not_writable() {
        let fields = FieldSet::new().with("id", 5);
        assert!(matches!(
            validate_field_set(schema(), &fields, WriteMode::Update),
            Err(ValidationError::UnknownColumn { .. })
        ));
    }

    #[test]
    fn test_single_field_violations() {
        let cases = [
            ("price", Value::Integer(-23)),
            ("quantity", Value::Integer(-1)),
            ("name", Value::from("")),
            ("supplier", Value::from("")),
            ("picture", Value::from("not bytes")),
            ("price", Value::Real(9.99)),
            ("quantity", Value::from("10")),
            ("name", Value::Null),
        ];

        for (column, value) in cases {
            let mut fields = red_shirt();
            fields.put(column, value.clone());
            let err = validate_field_set(schema(), &fields, WriteMode::Insert).unwrap_err();
            assert_eq!(err.column(), column, "insert {column} = {value:?}");

            let patch = FieldSet::new().with(column, value.clone());
            let err = validate_field_set(schema(), &patch, WriteMode::Update).unwrap_err();
            assert_eq!(err.column(), column, "update {column} = {value:?}");
        }
    }

    #[test]
    fn test_zero_is_allowed() {
        let patch = FieldSet::new().with("price", 0).with("quantity", 0);
        assert!(validate_field_set(schema(), &patch, WriteMode::Update).is_ok());
    }

    #[test]
    fn test_update_empty_is_valid() {
        assert!(validate_field_set(schema(), &FieldSet::new(), WriteMode::Update).is_ok());
    }

    #[test]
    fn test_picture_path_revision() {
        let schema = SchemaRevision::PicturePath.schema();
        let fields = FieldSet::new()
            .with("name", "Skate Sneaker")
            .with("price", 4999)
            .with("quantity", 3)
            .with("supplier", "Hudson Wholesale Inc.")
            .with("supplier_phone_number", "(555) 010-2030")
            .with("supplier_email", None::<String>)
            .with("picture_path", "/data/pictures/1.jpg");
        assert!(validate_field_set(schema, &fields, WriteMode::Insert).is_ok());

        // BLOB picture belongs to the other revision.
        let patch = FieldSet::new().with("picture", vec![1u8]);
        assert!(matches!(
            validate_field_set(schema, &patch, WriteMode::Update),
            Err(ValidationError::UnknownColumn { .. })
        ));

        // Contact columns carry no format rule at this layer.
        let patch = FieldSet::new().with("supplier_email", "not-an-email");
        assert!(validate_field_set(schema, &patch, WriteMode::Update).is_ok());

        let patch = FieldSet::new().with("supplier_email", 12);
        assert!(validate_field_set(schema, &patch, WriteMode::Update).is_err());
    }
}
