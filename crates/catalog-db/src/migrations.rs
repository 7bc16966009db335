//! # Schema Setup
//!
//! Creates the products table from the static column schema and tracks
//! its version in SQLite's `user_version` header field.
//!
//! ## Version Check
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  PRAGMA user_version                                                    │
//! │       │                                                                 │
//! │       ├── 0               → CREATE TABLE, set version                  │
//! │       ├── < SCHEMA_VERSION → on_upgrade (no-op), set version           │
//! │       ├── = SCHEMA_VERSION → nothing to do                             │
//! │       └── > SCHEMA_VERSION → MigrationFailed (no downgrade path)       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Table columns must match the configured revision                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use catalog_core::contract::{ProductSchema, SCHEMA_VERSION, TABLE_NAME};
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::error::{DbError, DbResult};

/// Brings the products table to [`SCHEMA_VERSION`] for `schema`.
///
/// Idempotent: safe to run against an existing database.
pub async fn ensure_schema(pool: &SqlitePool, schema: &ProductSchema) -> DbResult<()> {
    let version = schema_version(pool).await?;

    if version > SCHEMA_VERSION {
        return Err(DbError::MigrationFailed(format!(
            "database schema version {} is newer than supported version {}",
            version, SCHEMA_VERSION
        )));
    }

    if version < SCHEMA_VERSION {
        let mut tx = pool.begin().await?;

        if version == 0 {
            info!(table = TABLE_NAME, revision = %schema.revision, "Creating products table");
            sqlx::query(&schema.create_table_sql())
                .execute(&mut *tx)
                .await?;
        } else {
            on_upgrade(version, SCHEMA_VERSION);
        }

        // PRAGMA arguments cannot be bound
        sqlx::query(&format!("PRAGMA user_version = {}", SCHEMA_VERSION))
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
    }

    check_columns(pool, schema).await
}

/// Reads `PRAGMA user_version`.
pub async fn schema_version(pool: &SqlitePool) -> DbResult<i64> {
    let version: i64 = sqlx::query_scalar("PRAGMA user_version")
        .fetch_one(pool)
        .await?;
    Ok(version)
}

/// Upgrade hook. There is only one version so far, so nothing changes.
fn on_upgrade(from: i64, to: i64) {
    warn!(from, to, "Schema upgrade requested, no steps defined");
}

/// Fails if the table on disk was created for a different revision.
async fn check_columns(pool: &SqlitePool, schema: &ProductSchema) -> DbResult<()> {
    let actual: Vec<String> =
        sqlx::query_scalar("SELECT name FROM pragma_table_info(?1) ORDER BY cid")
            .bind(TABLE_NAME)
            .fetch_all(pool)
            .await?;

    let expected = schema.all_columns();
    if actual.iter().map(String::as_str).ne(expected.iter().copied()) {
        return Err(DbError::MigrationFailed(format!(
            "table {} has columns [{}], revision {} expects [{}]",
            TABLE_NAME,
            actual.join(", "),
            schema.revision,
            expected.join(", ")
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_core::SchemaRevision;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn raw_pool() -> SqlitePool {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_creates_table_and_version() {
        let pool = raw_pool().await;
        let schema = SchemaRevision::Picture.schema();

        ensure_schema(&pool, schema).await.unwrap();
        assert_eq!(schema_version(&pool).await.unwrap(), SCHEMA_VERSION);

        // idempotent
        ensure_schema(&pool, schema).await.unwrap();
    }

    #[tokio::test]
    async fn test_newer_version_is_refused() {
        let pool = raw_pool().await;
        sqlx::query("PRAGMA user_version = 99")
            .execute(&pool)
            .await
            .unwrap();

        let err = ensure_schema(&pool, SchemaRevision::Picture.schema())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::MigrationFailed(_)));
    }

    #[tokio::test]
    async fn test_revision_mismatch_is_refused() {
        let pool = raw_pool().await;
        ensure_schema(&pool, SchemaRevision::Picture.schema())
            .await
            .unwrap();

        let err = ensure_schema(&pool, SchemaRevision::PicturePath.schema())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("picture_path"));
    }
}
