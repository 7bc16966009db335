//! # Domain Types
//!
//! Typed views over the products table for callers that would rather not
//! work with raw [`FieldSet`]s and [`Row`]s.
//!
//! ```text
//! NewProduct ──into_field_set()──► FieldSet ──► ProductStore::insert
//! ProductStore::query ──► Row ──Product::from_row()──► Product
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::contract::{columns, SchemaRevision};
use crate::money::Money;
use crate::value::{FieldSet, Row};

// =============================================================================
// Product
// =============================================================================

/// One stored product.
///
/// Columns that do not exist in the store's schema revision are `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    /// Assigned by the store, never reused.
    pub id: i64,

    pub name: String,

    /// Price in cents.
    pub price_cents: i64,

    pub quantity: i64,

    pub supplier: String,

    /// Inline picture bytes (`Picture` revision).
    pub picture: Option<Vec<u8>>,

    pub supplier_phone_number: Option<String>,

    pub supplier_email: Option<String>,

    /// Path to externally stored picture bytes (`PicturePath` revision).
    pub picture_path: Option<String>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Builds a product from a full-width result row.
    ///
    /// Returns `None` if any NOT NULL column is missing from the row.
    pub fn from_row(row: &Row) -> Option<Self> {
        Some(Product {
            id: row.get_i64(columns::ID)?,
            name: row.get_text(columns::NAME)?.to_string(),
            price_cents: row.get_i64(columns::PRICE)?,
            quantity: row.get_i64(columns::QUANTITY)?,
            supplier: row.get_text(columns::SUPPLIER)?.to_string(),
            picture: row.get_blob(columns::PICTURE).map(<[u8]>::to_vec),
            supplier_phone_number: row
                .get_text(columns::SUPPLIER_PHONE_NUMBER)
                .map(str::to_string),
            supplier_email: row.get_text(columns::SUPPLIER_EMAIL).map(str::to_string),
            picture_path: row.get_text(columns::PICTURE_PATH).map(str::to_string),
        })
    }
}

// =============================================================================
// New Product
// =============================================================================

/// A product that has not been stored yet (no id).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewProduct {
    pub name: String,
    pub price_cents: i64,
    pub quantity: i64,
    pub supplier: String,
    pub picture: Option<Vec<u8>>,
    pub supplier_phone_number: Option<String>,
    pub supplier_email: Option<String>,
    pub picture_path: Option<String>,
}

impl NewProduct {
    /// Builds the exact insert field set for `revision`.
    ///
    /// Optional columns are always present (as null when unset), since an
    /// insert must name every column of its schema.
    pub fn into_field_set(self, revision: SchemaRevision) -> FieldSet {
        let fields = FieldSet::new()
            .with(columns::NAME, self.name)
            .with(columns::PRICE, self.price_cents)
            .with(columns::QUANTITY, self.quantity)
            .with(columns::SUPPLIER, self.supplier);

        match revision {
            SchemaRevision::Picture => fields.with(columns::PICTURE, self.picture),
            SchemaRevision::PicturePath => fields
                .with(columns::SUPPLIER_PHONE_NUMBER, self.supplier_phone_number)
                .with(columns::SUPPLIER_EMAIL, self.supplier_email)
                .with(columns::PICTURE_PATH, self.picture_path),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{validate_field_set, WriteMode};
    use crate::value::Value;
    use std::sync::Arc;

    fn shirt() -> NewProduct {
        NewProduct {
            name: "Cozy Cabin Flannel".to_string(),
            price_cents: 3450,
            quantity: 12,
            supplier: "Regards Wholesale".to_string(),
            ..NewProduct::default()
        }
    }

    #[test]
    fn test_field_set_matches_each_revision() {
        for revision in [SchemaRevision::Picture, SchemaRevision::PicturePath] {
            let fields = shirt().into_field_set(revision);
            assert_eq!(fields.len(), revision.schema().insert_width());
            assert!(validate_field_set(revision.schema(), &fields, WriteMode::Insert).is_ok());
        }
    }

    #[test]
    fn test_from_row() {
        let columns: Arc<[String]> = SchemaRevision::Picture
            .schema()
            .all_columns()
            .into_iter()
            .map(str::to_string)
            .collect();
        let row = Row::new(
            columns,
            vec![
                Value::Integer(4),
                Value::from("Skate Sneaker"),
                Value::Integer(4999),
                Value::Integer(2),
                Value::from("eFashion Wholesale"),
                Value::Blob(vec![9, 9]),
            ],
        );

        let product = Product::from_row(&row).unwrap();
        assert_eq!(product.id, 4);
        assert_eq!(product.price().to_plain_string(), "49.99");
        assert_eq!(product.picture, Some(vec![9, 9]));
        assert_eq!(product.picture_path, None);
    }

    #[test]
    fn test_from_row_requires_core_columns() {
        let columns: Arc<[String]> = vec!["id".to_string(), "name".to_string()].into();
        let row = Row::new(columns, vec![Value::Integer(1), Value::from("Cap")]);
        assert!(Product::from_row(&row).is_none());
    }
}
