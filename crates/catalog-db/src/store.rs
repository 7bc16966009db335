//! # Product Store
//!
//! The single entry point for reading and writing products. Every operation
//! is addressed by a content [`Address`]:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  content://<authority>/products       Collection → whole table         │
//! │  content://<authority>/products/7     Item(7)    → WHERE id = 7        │
//! │  anything else                        Unknown    → AddressUnresolved   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Write Path
//! ```text
//! insert/update/delete
//!     │
//!     ├── resolve address          ─── Unknown ──► StoreError::AddressUnresolved
//!     ├── validate field set       ─── bad     ──► StoreError::Validation
//!     ├── one statement on the write handle
//!     │                            ─── failed  ──► StoreError::Storage
//!     └── notify_change(address)   (insert always, update/delete only if
//!                                   rows were affected)
//! ```
//!
//! A rejected operation writes nothing and notifies nobody.
//!
//! ## Filters
//! Caller filters and sort orders are SQL fragments passed through as
//! written, with `?` placeholders bound from the filter arguments as text.
//! On an item address the caller's filter is ignored and `id = ?` is used
//! instead.

use catalog_core::contract::{self, ProductSchema, TABLE_NAME};
use catalog_core::validation::{validate_field_set, WriteMode};
use catalog_core::{Address, ContentKind, FieldSet, Row, ValidationError, Value};
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqliteRow};
use sqlx::{Row as _, TypeInfo, ValueRef};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::CatalogConfig;
use crate::cursor::ResultHandle;
use crate::error::{DbResult, StoreError, StoreResult};
use crate::gateway::Database;
use crate::notify::{ChangeNotifier, Subscription};

type SqliteQuery<'q> = Query<'q, Sqlite, SqliteArguments<'q>>;

// =============================================================================
// Selection
// =============================================================================

/// Which rows a statement touches.
#[derive(Debug, Clone, Copy)]
enum Selection<'a> {
    All,
    Filter { clause: &'a str, args: &'a [&'a str] },
    Id(i64),
}

impl<'a> Selection<'a> {
    fn new(kind: ContentKind, filter: Option<&'a str>, args: &'a [&'a str]) -> Self {
        match kind {
            ContentKind::Item(id) => Selection::Id(id),
            _ => match filter.filter(|f| !f.trim().is_empty()) {
                Some(clause) => Selection::Filter { clause, args },
                None => Selection::All,
            },
        }
    }

    fn push_where(&self, sql: &mut String) {
        match self {
            Selection::All => {}
            Selection::Filter { clause, .. } => {
                sql.push_str(" WHERE (");
                sql.push_str(clause);
                sql.push(')');
            }
            Selection::Id(_) => {
                sql.push_str(" WHERE ");
                sql.push_str(contract::columns::ID);
                sql.push_str(" = ?");
            }
        }
    }

    fn bind<'q>(&self, mut query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        match self {
            Selection::All => query,
            Selection::Filter { args, .. } => {
                for arg in args.iter() {
                    query = query.bind(arg.to_string());
                }
                query
            }
            Selection::Id(id) => query.bind(*id),
        }
    }
}

fn bind_value<'q>(query: SqliteQuery<'q>, value: &Value) -> SqliteQuery<'q> {
    match value {
        Value::Null => query.bind(None::<i64>),
        Value::Integer(v) => query.bind(*v),
        Value::Real(v) => query.bind(*v),
        Value::Text(v) => query.bind(v.clone()),
        Value::Blob(v) => query.bind(v.clone()),
    }
}

/// Reads column `index` as whatever storage class SQLite holds for it.
fn decode_value(row: &SqliteRow, index: usize) -> DbResult<Value> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(Value::Null);
    }

    let value = match raw.type_info().name() {
        "INTEGER" | "BOOLEAN" => Value::Integer(row.try_get_unchecked::<i64, _>(index)?),
        "REAL" => Value::Real(row.try_get_unchecked::<f64, _>(index)?),
        "TEXT" => Value::Text(row.try_get_unchecked::<String, _>(index)?),
        _ => Value::Blob(row.try_get_unchecked::<Vec<u8>, _>(index)?),
    };
    Ok(value)
}

fn decode_row(row: &SqliteRow, columns: &Arc<[String]>) -> DbResult<Row> {
    let values = (0..columns.len())
        .map(|index| decode_value(row, index))
        .collect::<DbResult<Vec<_>>>()?;
    Ok(Row::new(Arc::clone(columns), values))
}

// =============================================================================
// Product Store
// =============================================================================

/// Address-routed CRUD over the products table.
///
/// ## Usage
/// ```rust,ignore
/// let store = ProductStore::new(db, CONTENT_AUTHORITY);
///
/// let fields = NewProduct { .. }.into_field_set(store.revision());
/// let address = store.insert(&store.collection_address(), &fields).await?;
///
/// let result = store.query(&address, None, None, &[], None).await?;
/// ```
///
/// Clones share the database and the notifier.
#[derive(Debug, Clone)]
pub struct ProductStore {
    db: Database,
    notifier: ChangeNotifier,
    authority: String,
}

impl ProductStore {
    /// Creates a store with its own notifier.
    pub fn new(db: Database, authority: impl Into<String>) -> Self {
        ProductStore::with_notifier(db, authority, ChangeNotifier::new())
    }

    /// Creates a store that publishes through an existing notifier.
    pub fn with_notifier(
        db: Database,
        authority: impl Into<String>,
        notifier: ChangeNotifier,
    ) -> Self {
        ProductStore {
            db,
            notifier,
            authority: authority.into(),
        }
    }

    /// Connects with `config`. The table is created on first use.
    pub async fn open(config: &CatalogConfig) -> DbResult<Self> {
        let db = Database::new(config.db_config()).await?;
        Ok(ProductStore::new(db, config.provider.authority.clone()))
    }

    pub fn authority(&self) -> &str {
        &self.authority
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }

    pub fn schema(&self) -> &'static ProductSchema {
        self.db.schema()
    }

    pub fn revision(&self) -> catalog_core::SchemaRevision {
        self.db.revision()
    }

    /// `content://<authority>/products`
    pub fn collection_address(&self) -> Address {
        Address::collection(&self.authority)
    }

    /// `content://<authority>/products/<id>`
    pub fn item_address(&self, id: i64) -> Address {
        Address::item(&self.authority, id)
    }

    /// Observes `address`.
    ///
    /// Item changes only reach a collection subscription when
    /// `notify_for_descendants` is set; result handles from [`query`] always
    /// set it. Changes to an ancestor reach every subscription below it.
    ///
    /// [`query`]: ProductStore::query
    pub fn subscribe(&self, address: Address, notify_for_descendants: bool) -> Subscription {
        self.notifier.register(address, notify_for_descendants)
    }

    // =========================================================================
    // Routing
    // =========================================================================

    pub fn resolve_kind(&self, address: &Address) -> ContentKind {
        address.kind(&self.authority)
    }

    /// Type tag of the address, `None` if it does not resolve.
    pub fn describe_kind(&self, address: &Address) -> Option<String> {
        match self.resolve_kind(address) {
            ContentKind::Collection => Some(contract::list_type(&self.authority)),
            ContentKind::Item(_) => Some(contract::item_type(&self.authority)),
            ContentKind::Unknown => None,
        }
    }

    fn resolve(&self, address: &Address, operation: &str) -> StoreResult<ContentKind> {
        match self.resolve_kind(address) {
            ContentKind::Unknown => Err(self.unresolved(address, operation)),
            kind => Ok(kind),
        }
    }

    fn unresolved(&self, address: &Address, operation: &str) -> StoreError {
        warn!(address = %address, operation, "Address not supported");
        StoreError::AddressUnresolved(address.to_string())
    }

    fn validate(&self, fields: &FieldSet, mode: WriteMode) -> StoreResult<()> {
        validate_field_set(self.schema(), fields, mode).map_err(|e| {
            warn!(column = e.column(), error = %e, "Field set rejected");
            StoreError::from(e)
        })
    }

    /// Full column list when `projection` is absent or empty; otherwise
    /// the named columns, which must all exist.
    fn projection(&self, projection: Option<&[&str]>) -> StoreResult<Vec<String>> {
        let schema = self.schema();
        match projection {
            Some(names) if !names.is_empty() => names
                .iter()
                .map(|name| {
                    if schema.is_readable(name) {
                        Ok(name.to_string())
                    } else {
                        warn!(column = %name, "Unknown column in projection");
                        Err(StoreError::from(ValidationError::UnknownColumn {
                            column: name.to_string(),
                        }))
                    }
                })
                .collect(),
            _ => Ok(schema.all_columns().into_iter().map(str::to_string).collect()),
        }
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Stores a new product and returns its item address.
    ///
    /// `address` must be the collection address and `fields` must carry
    /// exactly the schema's columns.
    pub async fn insert(&self, address: &Address, fields: &FieldSet) -> StoreResult<Address> {
        if self.resolve(address, "insert")? != ContentKind::Collection {
            return Err(self.unresolved(address, "insert"));
        }
        self.validate(fields, WriteMode::Insert)?;

        let names: Vec<&str> = self.schema().columns.iter().map(|c| c.name).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            TABLE_NAME,
            names.join(", "),
            vec!["?"; names.len()].join(", ")
        );

        let mut query = sqlx::query(&sql);
        for name in &names {
            query = bind_value(query, fields.get(name).unwrap_or(&Value::Null));
        }

        let pool = self.db.write_handle().await?;
        let id = query.execute(pool).await?.last_insert_rowid();

        let inserted = address.with_appended_id(id);
        debug!(address = %inserted, "Product inserted");
        self.notifier.notify_change(address);

        Ok(inserted)
    }

    /// Reads products.
    ///
    /// The returned handle observes `address` (and everything under it)
    /// from before the read, so no change after the read can be missed.
    pub async fn query(
        &self,
        address: &Address,
        projection: Option<&[&str]>,
        filter: Option<&str>,
        filter_args: &[&str],
        sort_order: Option<&str>,
    ) -> StoreResult<ResultHandle> {
        let kind = self.resolve(address, "query")?;
        let columns = self.projection(projection)?;
        let selection = Selection::new(kind, filter, filter_args);

        let mut sql = format!("SELECT {} FROM {}", columns.join(", "), TABLE_NAME);
        selection.push_where(&mut sql);
        if let Some(order) = sort_order.filter(|o| !o.trim().is_empty()) {
            sql.push_str(" ORDER BY ");
            sql.push_str(order);
        }

        let subscription = self.notifier.register(address.clone(), true);

        let pool = self.db.read_handle().await?;
        let fetched = selection.bind(sqlx::query(&sql)).fetch_all(pool).await?;

        let columns: Arc<[String]> = columns.into();
        let rows = fetched
            .iter()
            .map(|row| decode_row(row, &columns))
            .collect::<DbResult<Vec<_>>>()?;

        debug!(address = %address, rows = rows.len(), "Query complete");
        Ok(ResultHandle::new(address.clone(), columns, rows, subscription))
    }

    /// Overwrites the given columns on every selected row.
    ///
    /// An empty field set is a no-op returning 0, whatever the address.
    pub async fn update(
        &self,
        address: &Address,
        fields: &FieldSet,
        filter: Option<&str>,
        filter_args: &[&str],
    ) -> StoreResult<u64> {
        if fields.is_empty() {
            debug!(address = %address, "Empty update, nothing to do");
            return Ok(0);
        }

        let kind = self.resolve(address, "update")?;
        self.validate(fields, WriteMode::Update)?;
        let selection = Selection::new(kind, filter, filter_args);

        // column names are schema names after validation
        let assignments: Vec<String> = fields.columns().map(|c| format!("{} = ?", c)).collect();
        let mut sql = format!("UPDATE {} SET {}", TABLE_NAME, assignments.join(", "));
        selection.push_where(&mut sql);

        let mut query = sqlx::query(&sql);
        for (_, value) in fields.iter() {
            query = bind_value(query, value);
        }
        query = selection.bind(query);

        let pool = self.db.write_handle().await?;
        let affected = query.execute(pool).await?.rows_affected();

        debug!(address = %address, affected, "Products updated");
        if affected > 0 {
            self.notifier.notify_change(address);
        }
        Ok(affected)
    }

    /// Removes every selected row.
    pub async fn delete(
        &self,
        address: &Address,
        filter: Option<&str>,
        filter_args: &[&str],
    ) -> StoreResult<u64> {
        let kind = self.resolve(address, "delete")?;
        let selection = Selection::new(kind, filter, filter_args);

        let mut sql = format!("DELETE FROM {}", TABLE_NAME);
        selection.push_where(&mut sql);

        let pool = self.db.write_handle().await?;
        let affected = selection
            .bind(sqlx::query(&sql))
            .execute(pool)
            .await?
            .rows_affected();

        debug!(address = %address, affected, "Products deleted");
        if affected > 0 {
            self.notifier.notify_change(address);
        }
        Ok(affected)
    }

    /// Number of rows in the table.
    pub async fn count(&self) -> StoreResult<i64> {
        let pool = self.db.read_handle().await?;
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", TABLE_NAME))
            .fetch_one(pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
