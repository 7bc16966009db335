//! # Addresses
//!
//! Opaque identifiers naming either the whole products collection or one
//! product by id.
//!
//! ## Address Shapes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  content://com.davidread.clothescatalog/products       → Collection     │
//! │  content://com.davidread.clothescatalog/products/42    → Item(42)       │
//! │  content://com.davidread.clothescatalog/suppliers      → Unknown        │
//! │  content://com.davidread.clothescatalog/products/abc   → Unknown        │
//! │  content://other.authority/products                    → Unknown        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! An item address is always the collection address plus one trailing
//! numeric segment, so the two shapes never overlap.

use std::fmt;
use std::str::FromStr;

use url::Url;

use crate::error::{CoreError, CoreResult};
use crate::{CONTENT_SCHEME, PATH_PRODUCTS};

/// Classification of an address against the provider's two known shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    /// All products.
    Collection,
    /// One product, by id.
    Item(i64),
    /// Anything else; every store operation refuses it.
    Unknown,
}

/// A parsed provider address.
///
/// Empty path segments are dropped, so `.../products/` and `.../products`
/// name the same collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address {
    scheme: String,
    authority: String,
    segments: Vec<String>,
}

impl Address {
    /// Address of the products collection under `authority`.
    pub fn collection(authority: &str) -> Self {
        Address {
            scheme: CONTENT_SCHEME.to_string(),
            authority: authority.to_string(),
            segments: vec![PATH_PRODUCTS.to_string()],
        }
    }

    /// Address of a single product under `authority`.
    pub fn item(authority: &str, id: i64) -> Self {
        Address::collection(authority).with_appended_id(id)
    }

    /// Parses an address from text.
    ///
    /// Only syntax is checked here; whether the address names anything the
    /// store knows about is decided by [`Address::kind`].
    pub fn parse(text: &str) -> CoreResult<Self> {
        let url = Url::parse(text).map_err(|e| CoreError::InvalidAddress {
            address: text.to_string(),
            reason: e.to_string(),
        })?;

        let host = url.host_str().ok_or_else(|| CoreError::InvalidAddress {
            address: text.to_string(),
            reason: "missing authority".to_string(),
        })?;
        let authority = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };

        let segments = url
            .path_segments()
            .map(|segments| {
                segments
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Address {
            scheme: url.scheme().to_string(),
            authority,
            segments,
        })
    }

    /// Returns a new address with `id` appended as the last segment.
    pub fn with_appended_id(&self, id: i64) -> Self {
        let mut segments = self.segments.clone();
        segments.push(id.to_string());
        Address {
            scheme: self.scheme.clone(),
            authority: self.authority.clone(),
            segments,
        }
    }

    /// Classifies this address for a provider registered under `authority`.
    pub fn kind(&self, authority: &str) -> ContentKind {
        if self.scheme != CONTENT_SCHEME || self.authority != authority {
            return ContentKind::Unknown;
        }

        match self.segments.as_slice() {
            [path] if path == PATH_PRODUCTS => ContentKind::Collection,
            [path, id] if path == PATH_PRODUCTS => match parse_numeric_segment(id) {
                Some(id) => ContentKind::Item(id),
                None => ContentKind::Unknown,
            },
            _ => ContentKind::Unknown,
        }
    }

    /// Parses the last segment as an id, if it is a non-negative integer.
    pub fn parse_id(&self) -> Option<i64> {
        self.segments.last().and_then(|s| parse_numeric_segment(s))
    }

    /// Returns true if `other` lies strictly below this address.
    ///
    /// The collection is an ancestor of every item address under it.
    pub fn is_ancestor_of(&self, other: &Address) -> bool {
        self.scheme == other.scheme
            && self.authority == other.authority
            && self.segments.len() < other.segments.len()
            && other.segments.starts_with(&self.segments)
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn authority(&self) -> &str {
        &self.authority
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

/// `#` in a route: one or more ASCII digits that fit an `i64`.
fn parse_numeric_segment(segment: &str) -> Option<i64> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme, self.authority)?;
        for segment in &self.segments {
            write!(f, "/{}", segment)?;
        }
        Ok(())
    }
}

impl FromStr for Address {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::parse(s)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CONTENT_AUTHORITY;

    fn kind_of(text: &str) -> ContentKind {
        Address::parse(text).unwrap().kind(CONTENT_AUTHORITY)
    }

    #[test]
    fn test_collection_and_item_shapes() {
        assert_eq!(
            kind_of("content://com.davidread.clothescatalog/products"),
            ContentKind::Collection
        );
        assert_eq!(
            kind_of("content://com.davidread.clothescatalog/products/"),
            ContentKind::Collection
        );
        assert_eq!(
            kind_of("content://com.davidread.clothescatalog/products/42"),
            ContentKind::Item(42)
        );
    }

    #[test]
    fn test_unknown_shapes() {
        assert_eq!(
            kind_of("content://com.davidread.clothescatalog/suppliers"),
            ContentKind::Unknown
        );
        assert_eq!(
            kind_of("content://com.davidread.clothescatalog/products/abc"),
            ContentKind::Unknown
        );
        assert_eq!(
            kind_of("content://com.davidread.clothescatalog/products/-3"),
            ContentKind::Unknown
        );
        assert_eq!(
            kind_of("content://com.davidread.clothescatalog/products/1/2"),
            ContentKind::Unknown
        );
        assert_eq!(
            kind_of("content://com.davidread.clothescatalog"),
            ContentKind::Unknown
        );
        assert_eq!(kind_of("content://other.app/products"), ContentKind::Unknown);
        assert_eq!(
            kind_of("https://com.davidread.clothescatalog/products"),
            ContentKind::Unknown
        );
        assert_eq!(
            kind_of("content://com.davidread.clothescatalog/products/99999999999999999999"),
            ContentKind::Unknown
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Address::parse("not an address").is_err());
        assert!("products/1".parse::<Address>().is_err());
    }

    #[test]
    fn test_display_round_trips() {
        let item = Address::item(CONTENT_AUTHORITY, 7);
        assert_eq!(
            item.to_string(),
            "content://com.davidread.clothescatalog/products/7"
        );
        assert_eq!(Address::parse(&item.to_string()).unwrap(), item);
    }

    #[test]
    fn test_appended_id() {
        let collection = Address::collection(CONTENT_AUTHORITY);
        let item = collection.with_appended_id(12);
        assert_eq!(item.kind(CONTENT_AUTHORITY), ContentKind::Item(12));
        assert_eq!(item.parse_id(), Some(12));
        assert_eq!(collection.parse_id(), None);
    }

    #[test]
    fn test_ancestry() {
        let collection = Address::collection(CONTENT_AUTHORITY);
        let item = Address::item(CONTENT_AUTHORITY, 3);
        assert!(collection.is_ancestor_of(&item));
        assert!(!item.is_ancestor_of(&collection));
        assert!(!collection.is_ancestor_of(&collection));
        assert!(!Address::collection("other.app").is_ancestor_of(&item));
    }
}
