use std::{str::FromStr, time::Duration};

use sqlx::{
    migrate::MigrateError,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous},
    SqlitePool,
};
use thiserror::Error;

mod category;
mod product;

pub use category::{CategoryRepository, CategoryStoreError};
pub use product::{ProductRepository, ProductStoreError};

pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Top-level database handle that owns the SQLite connection pool.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Establishes a new SQLite connection pool for the provided connection string.
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        Self::connect_with(database_url, DEFAULT_MAX_CONNECTIONS).await
    }

    /// Same as [`Database::connect`] with an explicit pool size.
    ///
    /// Every pooled connection enforces foreign keys and runs in WAL mode.
    pub async fn connect_with(
        database_url: &str,
        max_connections: u32,
    ) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(StorageError::Connect)?
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(BUSY_TIMEOUT);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(StorageError::Connect)?;

        Ok(Self { pool })
    }

    /// Applies migrations located under `migrations/`.
    pub async fn run_migrations(&self) -> Result<(), StorageError> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(StorageError::Migration)?;
        Ok(())
    }

    /// Returns a handle for the `categories` table.
    pub fn categories(&self) -> CategoryRepository {
        CategoryRepository::new(self.pool.clone())
    }

    /// Returns a handle for the `products` table.
    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone())
    }

    /// Exposes the inner pool when lower level access is required.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Waits for checked-out connections and closes the pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// General storage level errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to connect to sqlite: {0}")]
    Connect(sqlx::Error),
    #[error("failed to run database migrations: {0}")]
    Migration(MigrateError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Constraint failures the repositories translate into domain errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConstraintViolation {
    Unique,
    ForeignKey,
}

// Extended result codes reported by SQLite. A parent delete blocked by
// `ON DELETE RESTRICT` is reported as a trigger constraint.
const SQLITE_CONSTRAINT_UNIQUE: &str = "2067";
const SQLITE_CONSTRAINT_FOREIGNKEY: &str = "787";
const SQLITE_CONSTRAINT_TRIGGER: &str = "1811";

pub(crate) fn constraint_violation(err: &sqlx::Error) -> Option<ConstraintViolation> {
    let sqlx::Error::Database(db_err) = err else {
        return None;
    };
    match db_err.code().as_deref() {
        Some(SQLITE_CONSTRAINT_UNIQUE) => Some(ConstraintViolation::Unique),
        Some(SQLITE_CONSTRAINT_FOREIGNKEY | SQLITE_CONSTRAINT_TRIGGER) => {
            Some(ConstraintViolation::ForeignKey)
        }
        _ => None,
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[tokio::test]
    async fn migrations_apply() {
        let db = setup_db().await;

        let tables: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('categories', 'products')",
        )
        .fetch_one(db.pool())
        .await
        .expect("fetch tables");
        assert_eq!(tables.0, 2, "expected catalog tables to be created");
    }

    #[tokio::test]
    async fn in_memory_databases_are_isolated() {
        let first = setup_db().await;
        let second = setup_db().await;
        insert_category(&first, "Tools").await;

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM categories")
            .fetch_one(second.pool())
            .await
            .expect("count");
        assert_eq!(count.0, 0);
    }

    #[tokio::test]
    async fn foreign_keys_are_enforced() {
        let db = setup_db().await;
        let err = sqlx::query("INSERT INTO products (name, category_id) VALUES ('Hammer', 42)")
            .execute(db.pool())
            .await
            .expect_err("dangling category rejected");
        assert_eq!(
            constraint_violation(&err),
            Some(ConstraintViolation::ForeignKey)
        );
    }

    #[tokio::test]
    async fn restricted_parent_delete_is_a_foreign_key_violation() {
        let db = setup_db().await;
        let id = insert_category(&db, "Tools").await;
        insert_product(&db, "Hammer", id).await;

        let err = sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id)
            .execute(db.pool())
            .await
            .expect_err("restricted delete rejected");
        assert_eq!(
            constraint_violation(&err),
            Some(ConstraintViolation::ForeignKey)
        );
    }

    #[tokio::test]
    async fn file_backed_database_survives_reconnect() {
        let dir = tempfile::tempdir().expect("tempdir");
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("catalog.db").display());

        let db = Database::connect(&url).await.expect("connect");
        db.run_migrations().await.expect("migrations");
        insert_category(&db, "Tools").await;
        db.close().await;

        let reopened = Database::connect(&url).await.expect("reconnect");
        reopened.run_migrations().await.expect("migrations are idempotent");
        let categories = reopened.categories().list_all().await.expect("list");
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].name, "Tools");
    }
}
