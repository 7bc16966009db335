//! # Column Values
//!
//! The untyped column→value map handed to insert/update is modeled as a
//! [`FieldSet`] of tagged-union [`Value`]s, and every query result row is a
//! [`Row`] of the same values. The schema in [`crate::contract`] says which
//! variant each column expects; [`crate::validation`] checks the two agree.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

// =============================================================================
// Value
// =============================================================================

/// One column value, mirroring SQLite's storage classes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Value {
    /// Short name of the variant, for logs.
    pub const fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Integer(_) => "integer",
            Value::Real(_) => "real",
            Value::Text(_) => "text",
            Value::Blob(_) => "blob",
        }
    }

    #[inline]
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_real(&self) -> Option<f64> {
        match self {
            Value::Real(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_blob(&self) -> Option<&[u8]> {
        match self {
            Value::Blob(v) => Some(v),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Blob(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Blob(v.to_vec())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

// =============================================================================
// Field Set
// =============================================================================

/// Mapping of column name → value supplied to insert/update.
///
/// ## Example
/// ```rust
/// use catalog_core::value::{FieldSet, Value};
///
/// let fields = FieldSet::new()
///     .with("name", "Red T-Shirt")
///     .with("price", 1000)
///     .with("picture", None::<Vec<u8>>);
///
/// assert_eq!(fields.len(), 3);
/// assert_eq!(fields.get("picture"), Some(&Value::Null));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldSet {
    values: BTreeMap<String, Value>,
}

impl FieldSet {
    pub fn new() -> Self {
        FieldSet::default()
    }

    /// Builder form of [`FieldSet::put`].
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.put(column, value);
        self
    }

    /// Sets a column, returning the value it replaced.
    pub fn put(&mut self, column: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(column.into(), value.into())
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.values.contains_key(column)
    }

    pub fn remove(&mut self, column: &str) -> Option<Value> {
        self.values.remove(column)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates columns in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for FieldSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = FieldSet::new();
        for (k, v) in iter {
            fields.put(k, v);
        }
        fields
    }
}

// =============================================================================
// Row
// =============================================================================

/// One result row: column names shared across the result, values owned.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    /// Creates a row. `values` is expected to line up with `columns`.
    pub fn new(columns: Arc<[String]>, values: Vec<Value>) -> Self {
        Row { columns, values }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Position of a column, or `None` if the result does not carry it.
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Value of a column, or `None` if the result does not carry it.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.column_index(column).and_then(|i| self.values.get(i))
    }

    pub fn get_i64(&self, column: &str) -> Option<i64> {
        self.get(column).and_then(Value::as_integer)
    }

    pub fn get_text(&self, column: &str) -> Option<&str> {
        self.get(column).and_then(Value::as_text)
    }

    pub fn get_blob(&self, column: &str) -> Option<&[u8]> {
        self.get(column).and_then(Value::as_blob)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_conversions() {
        assert_eq!(Value::from(5), Value::Integer(5));
        assert_eq!(Value::from("x"), Value::Text("x".to_string()));
        assert_eq!(Value::from(vec![1u8, 2]), Value::Blob(vec![1, 2]));
        assert_eq!(Value::from(None::<String>), Value::Null);
        assert_eq!(Value::from(Some(3i64)), Value::Integer(3));
        assert_eq!(Value::Real(1.5).type_name(), "real");
    }

    #[test]
    fn test_field_set_put_replaces() {
        let mut fields = FieldSet::new().with("quantity", 1);
        let old = fields.put("quantity", 2);
        assert_eq!(old, Some(Value::Integer(1)));
        assert_eq!(fields.len(), 1);
        assert_eq!(fields.get("quantity").and_then(Value::as_integer), Some(2));
    }

    #[test]
    fn test_field_set_from_iter() {
        let fields: FieldSet = vec![("name", "Cap"), ("supplier", "Hudson")]
            .into_iter()
            .collect();
        assert_eq!(fields.columns().collect::<Vec<_>>(), vec!["name", "supplier"]);
    }

    #[test]
    fn test_value_serde_shape() {
        let json = serde_json::to_string(&Value::Integer(5)).unwrap();
        assert_eq!(json, r#"{"integer":5}"#);
        let back: Value = serde_json::from_str(r#"{"text":"Cap"}"#).unwrap();
        assert_eq!(back, Value::from("Cap"));
        assert_eq!(serde_json::to_string(&Value::Null).unwrap(), r#""null""#);
    }

    #[test]
    fn test_row_lookup() {
        let columns: Arc<[String]> = vec!["id".to_string(), "name".to_string()].into();
        let row = Row::new(columns, vec![Value::Integer(1), Value::from("Cap")]);
        assert_eq!(row.get_i64("id"), Some(1));
        assert_eq!(row.get_text("name"), Some("Cap"));
        assert_eq!(row.get("price"), None);
        assert_eq!(row.get_i64("name"), None);
    }
}
