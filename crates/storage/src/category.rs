use sqlx::{Sqlite, SqlitePool, Transaction};
use thiserror::Error;

use catalog_core::types::{Category, CategoryInput};

use crate::{constraint_violation, ConstraintViolation};

/// Repository responsible for the `categories` table.
#[derive(Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    pub(crate) fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Begins a SQLite transaction.
    pub async fn begin(&self) -> Result<Transaction<'_, Sqlite>, sqlx::Error> {
        self.pool.begin().await
    }

    /// Lists every category ordered by id.
    pub async fn list_all(&self) -> Result<Vec<Category>, CategoryStoreError> {
        let rows = sqlx::query_as::<_, CategoryRow>("SELECT id, name FROM categories ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(CategoryRow::into_domain).collect())
    }

    /// Loads a single category.
    pub async fn find(&self, id: i64) -> Result<Option<Category>, CategoryStoreError> {
        let row = sqlx::query_as::<_, CategoryRow>("SELECT id, name FROM categories WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(CategoryRow::into_domain))
    }

    /// Inserts a category and returns it with the id assigned by the store.
    pub async fn insert(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        input: &CategoryInput,
    ) -> Result<Category, CategoryStoreError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "INSERT INTO categories (name, name_key) VALUES (?, ?) RETURNING id, name",
        )
        .bind(&input.name)
        .bind(input.name_key())
        .fetch_one(&mut **tx)
        .await
        .map_err(map_write_error)?;

        Ok(row.into_domain())
    }

    /// Overwrites the name of an existing category.
    pub async fn rename(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        id: i64,
        input: &CategoryInput,
    ) -> Result<Category, CategoryStoreError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "UPDATE categories SET name = ?, name_key = ? WHERE id = ? RETURNING id, name",
        )
        .bind(&input.name)
        .bind(input.name_key())
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(map_write_error)?;

        row.map(CategoryRow::into_domain)
            .ok_or(CategoryStoreError::NotFound)
    }

    /// Counts the products that reference the category.
    pub async fn count_products(&self, id: i64) -> Result<i64, CategoryStoreError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products WHERE category_id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count.0)
    }

    /// Deletes the category. Fails when the row is missing or still referenced.
    pub async fn delete(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        id: i64,
    ) -> Result<(), CategoryStoreError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id)
            .execute(&mut **tx)
            .await
            .map_err(map_write_error)?;

        if result.rows_affected() == 0 {
            return Err(CategoryStoreError::NotFound);
        }
        Ok(())
    }
}

fn map_write_error(err: sqlx::Error) -> CategoryStoreError {
    match constraint_violation(&err) {
        Some(ConstraintViolation::Unique) => CategoryStoreError::Duplicate,
        Some(ConstraintViolation::ForeignKey) => CategoryStoreError::Referenced,
        None => CategoryStoreError::Database(err),
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    id: i64,
    name: String,
}

impl CategoryRow {
    fn into_domain(self) -> Category {
        Category {
            id: self.id,
            name: self.name,
        }
    }
}

/// Errors that can occur while reading or mutating categories.
#[derive(Debug, Error)]
pub enum CategoryStoreError {
    #[error("a category with the same name already exists")]
    Duplicate,
    #[error("category not found")]
    NotFound,
    #[error("category is still referenced by products")]
    Referenced,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}
