//! # catalog-core: Pure Domain Logic for the Clothes Catalog
//!
//! This crate is the naming and typing authority for the products table.
//! Everything here is a pure function or a constant; no I/O happens.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Clothes Catalog Architecture                        │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              List / Detail screens (external)                   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ address + field set                    │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │            catalog-db: ProductStore (resource façade)           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ catalog-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌───────────┐         │   │
//! │  │   │ contract │ │ address  │ │  value   │ │ validation│         │   │
//! │  │   │ columns  │ │ routing  │ │ FieldSet │ │  schema-  │         │   │
//! │  │   │ type tags│ │ kinds    │ │ Row      │ │  driven   │         │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └───────────┘         │   │
//! │  │   ┌──────────┐ ┌──────────┐                                    │   │
//! │  │   │  money   │ │  types   │                                    │   │
//! │  │   │  cents   │ │ Product  │                                    │   │
//! │  │   └──────────┘ └──────────┘                                    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`contract`] - Authority, paths, column names, static column schemas
//! - [`address`] - Collection/item addresses and their classification
//! - [`value`] - Tagged-union column values, field sets, result rows
//! - [`validation`] - One generic validator driven by the column schema
//! - [`money`] - Integer-cent prices and their display strings
//! - [`types`] - Typed `Product` records
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use catalog_core::address::{Address, ContentKind};
//! use catalog_core::money::Money;
//!
//! let item = Address::item(catalog_core::CONTENT_AUTHORITY, 7);
//! assert_eq!(item.kind(catalog_core::CONTENT_AUTHORITY), ContentKind::Item(7));
//!
//! let price = Money::from_display(12.5);
//! assert_eq!(price.to_plain_string(), "12.50");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod address;
pub mod contract;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;
pub mod value;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use address::{Address, ContentKind};
pub use contract::{ProductSchema, SchemaRevision};
pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use types::{NewProduct, Product};
pub use value::{FieldSet, Row, Value};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Unique identifier of the product provider.
///
/// Every address the store answers to lives under this authority.
pub const CONTENT_AUTHORITY: &str = "com.davidread.clothescatalog";

/// URI scheme of every provider address.
pub const CONTENT_SCHEME: &str = "content";

/// Path segment naming the products collection.
pub const PATH_PRODUCTS: &str = "products";
