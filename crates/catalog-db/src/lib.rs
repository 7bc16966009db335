//! # catalog-db: Storage Layer for the Clothes Catalog
//!
//! This crate owns the products table. Screens never touch SQLite directly;
//! they go through [`ProductStore`] with a content address.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Clothes Catalog Data Flow                          │
//! │                                                                         │
//! │  List screen / detail screen                                           │
//! │       │  insert / query / update / delete (Address, FieldSet)          │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   catalog-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │ ProductStore  │───►│   Database    │───►│  migrations  │  │   │
//! │  │   │  (store.rs)   │    │ (gateway.rs)  │    │ user_version │  │   │
//! │  │   └──────┬────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │          │ notify_change                                       │   │
//! │  │          ▼                                                      │   │
//! │  │   ┌───────────────┐    ┌───────────────┐                       │   │
//! │  │   │ChangeNotifier │───►│ ResultHandle  │ ◄── ResultSlot        │   │
//! │  │   │  (notify.rs)  │    │  (cursor.rs)  │                       │   │
//! │  │   └───────────────┘    └───────────────┘                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite: <data dir>/products.db                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`config`] - Layered `catalog.toml` / environment configuration
//! - [`gateway`] - Connection pool and lazy schema creation
//! - [`migrations`] - Table creation and version check
//! - [`notify`] - Change notification keyed by address
//! - [`cursor`] - Live result handles and the result slot
//! - [`store`] - The `ProductStore` façade
//! - [`error`] - Database and store error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use catalog_db::{CatalogConfig, ProductStore};
//!
//! let config = CatalogConfig::load_or_default(None);
//! let store = ProductStore::open(&config).await?;
//!
//! let result = store
//!     .query(&store.collection_address(), None, None, &[], Some("name"))
//!     .await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod cursor;
pub mod error;
pub mod gateway;
pub mod migrations;
pub mod notify;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{CatalogConfig, ConfigError};
pub use cursor::{ResultHandle, ResultSlot};
pub use error::{DbError, DbResult, StoreError, StoreResult};
pub use gateway::{Database, DbConfig};
pub use notify::{ChangeNotifier, Subscription};
pub use store::ProductStore;
