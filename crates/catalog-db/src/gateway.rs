//! # Database Gateway
//!
//! Connection pool creation and lazy schema setup for the products database.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Database Gateway                                   │
//! │                                                                         │
//! │  DbConfig::new(path) ← Configure pool settings + schema revision       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::new(config).await ← Create pool (no tables touched yet)     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  read_handle() / write_handle()                                        │
//! │       │                                                                 │
//! │       ├── first call: ensure_schema() ─► migrations::ensure_schema     │
//! │       │               (runs once, later calls wait on the same cell)   │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────┐                           │
//! │  │            SqlitePool                    │                           │
//! │  │  ┌─────┐ ┌─────┐ ┌─────┐ ┌─────┐       │                           │
//! │  │  │Conn1│ │Conn2│ │Conn3│ │Conn4│ ...   │  (max_connections)        │
//! │  │  └─────┘ └─────┘ └─────┘ └─────┘       │                           │
//! │  └─────────────────────────────────────────┘                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Read and write handles are the same pool. The split only records the
//! caller's intent, so a reader can never observe a half-created table.

use catalog_core::contract::ProductSchema;
use catalog_core::SchemaRevision;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;

const MEMORY_PATH: &str = ":memory:";

// =============================================================================
// Configuration
// =============================================================================

/// Database configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new("/path/to/products.db")
///     .max_connections(5)
///     .schema_revision(SchemaRevision::PicturePath);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path to the SQLite database file, or `:memory:`.
    pub database_path: PathBuf,

    /// Maximum number of connections in the pool.
    /// Default: 5
    pub max_connections: u32,

    /// Minimum number of connections to keep alive.
    /// Default: 1
    pub min_connections: u32,

    /// Connection timeout duration.
    /// Default: 30 seconds
    pub connect_timeout: Duration,

    /// Idle timeout before closing a connection.
    /// Default: 10 minutes. Ignored for in-memory databases.
    pub idle_timeout: Duration,

    /// Table layout created on first use.
    pub schema_revision: SchemaRevision,
}

impl DbConfig {
    /// Creates a new database configuration with the given path.
    ///
    /// The file is created on first connect if it doesn't exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            schema_revision: SchemaRevision::default(),
        }
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the minimum number of connections.
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Sets the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Sets the table layout.
    pub fn schema_revision(mut self, revision: SchemaRevision) -> Self {
        self.schema_revision = revision;
        self
    }

    /// Creates an in-memory database configuration (for testing).
    ///
    /// Every in-memory connection is its own database, so the pool is
    /// pinned to one connection that is never recycled.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(MEMORY_PATH),
            max_connections: 1,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60),
            schema_revision: SchemaRevision::default(),
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_path == Path::new(MEMORY_PATH)
    }
}

// =============================================================================
// Database
// =============================================================================

/// Owns the SQLite pool and creates the products table on first use.
///
/// Cloning is cheap and every clone shares the pool and the
/// schema-ready cell.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
    revision: SchemaRevision,
    schema_ready: Arc<OnceCell<()>>,
}

impl Database {
    /// Creates a new database connection pool.
    ///
    /// ## What This Does
    /// 1. Creates the database file if it doesn't exist
    /// 2. Configures SQLite:
    ///    - WAL mode for concurrent reads (file databases only)
    ///    - NORMAL synchronous (balance of safety/speed)
    /// 3. Creates the connection pool
    ///
    /// The products table is *not* created here; see [`Database::ensure_schema`].
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            schema = %config.schema_revision,
            "Initializing database connection"
        );

        let in_memory = config.is_in_memory();

        let connect_options = if in_memory {
            SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
        } else {
            SqliteConnectOptions::new()
                .filename(&config.database_path)
                // WAL mode: Readers don't block writers, writers don't block readers
                .journal_mode(SqliteJournalMode::Wal)
                .create_if_missing(true)
        }
        .synchronous(SqliteSynchronous::Normal);

        debug!("Connection options configured");

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout);

        pool_options = if in_memory {
            pool_options.idle_timeout(None).max_lifetime(None)
        } else {
            pool_options.idle_timeout(Some(config.idle_timeout))
        };

        let pool = pool_options
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        info!(
            max_connections = config.max_connections,
            "Database pool created"
        );

        Ok(Database {
            pool,
            revision: config.schema_revision,
            schema_ready: Arc::new(OnceCell::new()),
        })
    }

    /// Creates the products table if needed. Runs at most once per pool;
    /// concurrent first callers all wait for the same creation.
    ///
    /// A failed attempt leaves the cell empty, so the next caller retries.
    pub async fn ensure_schema(&self) -> DbResult<()> {
        self.schema_ready
            .get_or_try_init(|| async {
                info!(schema = %self.revision, "Preparing products schema");
                migrations::ensure_schema(&self.pool, self.schema()).await
            })
            .await?;
        Ok(())
    }

    /// Pool for reads, schema guaranteed to exist.
    pub async fn read_handle(&self) -> DbResult<&SqlitePool> {
        self.ensure_schema().await?;
        Ok(&self.pool)
    }

    /// Pool for writes, schema guaranteed to exist.
    pub async fn write_handle(&self) -> DbResult<&SqlitePool> {
        self.ensure_schema().await?;
        Ok(&self.pool)
    }

    pub fn revision(&self) -> SchemaRevision {
        self.revision
    }

    /// Column schema of the configured revision.
    pub fn schema(&self) -> &'static ProductSchema {
        self.revision.schema()
    }

    /// `PRAGMA user_version` of the database (0 before first use).
    pub async fn schema_version(&self) -> DbResult<i64> {
        migrations::schema_version(&self.pool).await
    }

    /// Closes the database connection pool.
    ///
    /// After calling close, every store operation fails with a storage error.
    pub async fn close(&self) {
        info!("Closing database connection pool");
        self.pool.close().await;
    }

    /// Checks if the database is healthy (can execute queries).
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_core::contract::SCHEMA_VERSION;

    #[tokio::test]
    async fn test_in_memory_database() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.health_check().await);
    }

    #[test]
    fn test_config_builder() {
        let config = DbConfig::new("/tmp/test.db")
            .max_connections(10)
            .min_connections(2)
            .schema_revision(SchemaRevision::PicturePath);

        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 2);
        assert_eq!(config.schema_revision, SchemaRevision::PicturePath);
        assert!(!config.is_in_memory());
        assert!(DbConfig::in_memory().is_in_memory());
    }

    #[tokio::test]
    async fn test_schema_is_created_lazily() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert_eq!(db.schema_version().await.unwrap(), 0);

        db.read_handle().await.unwrap();
        assert_eq!(db.schema_version().await.unwrap(), SCHEMA_VERSION);

        // second call is a no-op
        db.write_handle().await.unwrap();
        assert_eq!(db.schema_version().await.unwrap(), SCHEMA_VERSION);
    }

    #[tokio::test]
    async fn test_concurrent_first_use() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let (a, b) = tokio::join!(db.ensure_schema(), db.ensure_schema());
        assert!(a.is_ok() && b.is_ok());
        assert_eq!(db.schema_version().await.unwrap(), SCHEMA_VERSION);
    }

    #[tokio::test]
    async fn test_closed_pool_fails() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.close().await;
        assert!(!db.health_check().await);
        assert!(db.read_handle().await.is_err());
    }

    #[tokio::test]
    async fn test_file_database_persists() {
        let path = std::env::temp_dir().join(format!("catalog-gateway-{}.db", std::process::id()));
        let _ = std::fs::remove_file(&path);

        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        db.ensure_schema().await.unwrap();
        db.close().await;

        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        assert_eq!(db.schema_version().await.unwrap(), SCHEMA_VERSION);
        db.ensure_schema().await.unwrap();
        db.close().await;

        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{}", path.display(), suffix));
        }
    }
}
