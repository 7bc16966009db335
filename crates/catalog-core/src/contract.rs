//! # Product Contract
//!
//! Naming and typing authority for the products table: table and column
//! names, MIME-style type tags, and the static column schema every other
//! component validates against.
//!
//! ## Schema Revisions
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Picture (default)              PicturePath                             │
//! │  ───────────────────            ─────────────────────────               │
//! │  id        INTEGER PK AI        id                    INTEGER PK AI     │
//! │  name      TEXT NOT NULL        name                  TEXT NOT NULL     │
//! │  price     INTEGER NOT NULL     price                 INTEGER NOT NULL  │
//! │  quantity  INTEGER NOT NULL     quantity              INTEGER NOT NULL  │
//! │  supplier  TEXT NOT NULL        supplier              TEXT NOT NULL     │
//! │  picture   BLOB                 supplier_phone_number TEXT              │
//! │                                 supplier_email        TEXT              │
//! │                                 picture_path          TEXT              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Both layouts are version 1 of their own database; there is no upgrade
//! path between them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::PATH_PRODUCTS;

/// Table name of the products table.
pub const TABLE_NAME: &str = "products";

/// Version of the persisted schema. Fixed for the life of this design.
pub const SCHEMA_VERSION: i64 = 1;

/// Type prefix for addresses that refer to a list of rows.
pub const CURSOR_DIR_BASE_TYPE: &str = "vnd.android.cursor.dir";

/// Type prefix for addresses that refer to a single row.
pub const CURSOR_ITEM_BASE_TYPE: &str = "vnd.android.cursor.item";

/// Column names of the products table.
pub mod columns {
    pub const ID: &str = "id";
    pub const NAME: &str = "name";
    pub const PRICE: &str = "price";
    pub const QUANTITY: &str = "quantity";
    pub const SUPPLIER: &str = "supplier";
    pub const PICTURE: &str = "picture";
    pub const SUPPLIER_PHONE_NUMBER: &str = "supplier_phone_number";
    pub const SUPPLIER_EMAIL: &str = "supplier_email";
    pub const PICTURE_PATH: &str = "picture_path";
}

// =============================================================================
// Column Schema
// =============================================================================

/// Storage type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Integer,
    Text,
    Blob,
}

impl ColumnType {
    /// SQL type name used in `CREATE TABLE`.
    pub const fn sql(&self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Text => "TEXT",
            ColumnType::Blob => "BLOB",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Integer => write!(f, "an integer"),
            ColumnType::Text => write!(f, "text"),
            ColumnType::Blob => write!(f, "a blob"),
        }
    }
}

/// Range check applied to a present, non-null value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    /// Any value of the right type.
    Any,
    /// Text must contain at least one character.
    NonEmpty,
    /// Integer must be `>= 0`.
    NonNegative,
}

/// Static description of one writable column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub column_type: ColumnType,
    pub nullable: bool,
    pub constraint: Constraint,
    /// SQL default clause, if any.
    pub default: Option<&'static str>,
}

impl ColumnSpec {
    const fn required(name: &'static str, column_type: ColumnType, constraint: Constraint) -> Self {
        ColumnSpec {
            name,
            column_type,
            nullable: false,
            constraint,
            default: None,
        }
    }

    const fn with_default(mut self, default: &'static str) -> Self {
        self.default = Some(default);
        self
    }

    const fn optional(name: &'static str, column_type: ColumnType) -> Self {
        ColumnSpec {
            name,
            column_type,
            nullable: true,
            constraint: Constraint::Any,
            default: None,
        }
    }

    /// Column definition for `CREATE TABLE`.
    pub fn definition(&self) -> String {
        let mut def = format!("{} {}", self.name, self.column_type.sql());
        if !self.nullable {
            def.push_str(" NOT NULL");
        }
        if let Some(default) = self.default {
            def.push_str(" DEFAULT ");
            def.push_str(default);
        }
        def
    }
}

// =============================================================================
// Schema Revision
// =============================================================================

/// Which table layout a database uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaRevision {
    /// Picture bytes stored inline as a BLOB.
    #[default]
    Picture,
    /// Picture stored as a file path, plus supplier contact columns.
    PicturePath,
}

impl SchemaRevision {
    /// Returns the static column schema for this revision.
    pub fn schema(&self) -> &'static ProductSchema {
        match self {
            SchemaRevision::Picture => &PICTURE_SCHEMA,
            SchemaRevision::PicturePath => &PICTURE_PATH_SCHEMA,
        }
    }
}

impl fmt::Display for SchemaRevision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaRevision::Picture => write!(f, "picture"),
            SchemaRevision::PicturePath => write!(f, "picture_path"),
        }
    }
}

impl FromStr for SchemaRevision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "picture" => Ok(SchemaRevision::Picture),
            "picture_path" | "picture-path" => Ok(SchemaRevision::PicturePath),
            _ => Err(format!("Unknown schema revision: {}", s)),
        }
    }
}

// =============================================================================
// Product Schema
// =============================================================================

/// The full writable column set of one revision.
///
/// `id` is deliberately absent: it is assigned by the store and never
/// written by callers.
#[derive(Debug, PartialEq, Eq)]
pub struct ProductSchema {
    pub revision: SchemaRevision,
    pub columns: &'static [ColumnSpec],
}

const NAME: ColumnSpec = ColumnSpec::required(columns::NAME, ColumnType::Text, Constraint::NonEmpty);
const PRICE: ColumnSpec =
    ColumnSpec::required(columns::PRICE, ColumnType::Integer, Constraint::NonNegative).with_default("0");
const QUANTITY: ColumnSpec =
    ColumnSpec::required(columns::QUANTITY, ColumnType::Integer, Constraint::NonNegative)
        .with_default("0");
const SUPPLIER: ColumnSpec =
    ColumnSpec::required(columns::SUPPLIER, ColumnType::Text, Constraint::NonEmpty);

static PICTURE_SCHEMA: ProductSchema = ProductSchema {
    revision: SchemaRevision::Picture,
    columns: &[
        NAME,
        PRICE,
        QUANTITY,
        SUPPLIER,
        ColumnSpec::optional(columns::PICTURE, ColumnType::Blob),
    ],
};

static PICTURE_PATH_SCHEMA: ProductSchema = ProductSchema {
    revision: SchemaRevision::PicturePath,
    columns: &[
        NAME,
        PRICE,
        QUANTITY,
        SUPPLIER,
        ColumnSpec::optional(columns::SUPPLIER_PHONE_NUMBER, ColumnType::Text),
        ColumnSpec::optional(columns::SUPPLIER_EMAIL, ColumnType::Text),
        ColumnSpec::optional(columns::PICTURE_PATH, ColumnType::Text),
    ],
};

impl ProductSchema {
    /// Looks up a writable column by name.
    pub fn column(&self, name: &str) -> Option<&'static ColumnSpec> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Whether `name` may appear in a projection (writable columns plus `id`).
    pub fn is_readable(&self, name: &str) -> bool {
        name == columns::ID || self.column(name).is_some()
    }

    /// Every readable column, `id` first, in table order.
    pub fn all_columns(&self) -> Vec<&'static str> {
        std::iter::once(columns::ID)
            .chain(self.columns.iter().map(|c| c.name))
            .collect()
    }

    /// Number of columns an insert must carry.
    pub fn insert_width(&self) -> usize {
        self.columns.len()
    }

    /// `CREATE TABLE IF NOT EXISTS` statement for this revision.
    pub fn create_table_sql(&self) -> String {
        let mut defs = vec![format!("{} INTEGER PRIMARY KEY AUTOINCREMENT", columns::ID)];
        defs.extend(self.columns.iter().map(ColumnSpec::definition));
        format!("CREATE TABLE IF NOT EXISTS {} ({})", TABLE_NAME, defs.join(", "))
    }
}

// =============================================================================
// Type Tags
// =============================================================================

/// Type tag for an address naming the whole collection.
pub fn list_type(authority: &str) -> String {
    format!("{}/{}/{}", CURSOR_DIR_BASE_TYPE, authority, PATH_PRODUCTS)
}

/// Type tag for an address naming a single product.
pub fn item_type(authority: &str) -> String {
    format!("{}/{}/{}", CURSOR_ITEM_BASE_TYPE, authority, PATH_PRODUCTS)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CONTENT_AUTHORITY;

    #[test]
    fn test_picture_schema_sql() {
        assert_eq!(
            SchemaRevision::Picture.schema().create_table_sql(),
            "CREATE TABLE IF NOT EXISTS products (\
             id INTEGER PRIMARY KEY AUTOINCREMENT, \
             name TEXT NOT NULL, \
             price INTEGER NOT NULL DEFAULT 0, \
             quantity INTEGER NOT NULL DEFAULT 0, \
             supplier TEXT NOT NULL, \
             picture BLOB)"
        );
    }

    #[test]
    fn test_picture_path_schema_columns() {
        let schema = SchemaRevision::PicturePath.schema();
        assert_eq!(schema.insert_width(), 7);
        assert!(schema.column(columns::PICTURE).is_none());
        assert_eq!(
            schema.column(columns::PICTURE_PATH).map(|c| c.column_type),
            Some(ColumnType::Text)
        );
        assert!(schema
            .create_table_sql()
            .contains("supplier_email TEXT, picture_path TEXT)"));
    }

    #[test]
    fn test_id_is_readable_not_writable() {
        let schema = SchemaRevision::Picture.schema();
        assert!(schema.is_readable(columns::ID));
        assert!(schema.column(columns::ID).is_none());
        assert!(!schema.is_readable("colour"));
        assert_eq!(
            schema.all_columns(),
            vec!["id", "name", "price", "quantity", "supplier", "picture"]
        );
    }

    #[test]
    fn test_type_tags_are_distinct() {
        let list = list_type(CONTENT_AUTHORITY);
        let item = item_type(CONTENT_AUTHORITY);
        assert_eq!(list, "vnd.android.cursor.dir/com.davidread.clothescatalog/products");
        assert_eq!(item, "vnd.android.cursor.item/com.davidread.clothescatalog/products");
        assert_ne!(list, item);
    }

    #[test]
    fn test_revision_parse() {
        assert_eq!("picture".parse::<SchemaRevision>(), Ok(SchemaRevision::Picture));
        assert_eq!(
            "Picture-Path".parse::<SchemaRevision>(),
            Ok(SchemaRevision::PicturePath)
        );
        assert!("video".parse::<SchemaRevision>().is_err());
    }
}
