use sqlx::{Sqlite, SqlitePool, Transaction};
use thiserror::Error;

use catalog_core::paging::{Page, PageRequest};
use catalog_core::types::{Category, Product, ProductInput, ProductListing};

use crate::{constraint_violation, ConstraintViolation};

/// Repository responsible for the `products` table.
#[derive(Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub(crate) fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Begins a SQLite transaction.
    pub async fn begin(&self) -> Result<Transaction<'_, Sqlite>, sqlx::Error> {
        self.pool.begin().await
    }

    /// Loads one page of products ordered by id, joined with their category.
    ///
    /// The count and the slice are read in the same transaction so the pager
    /// numbers always describe the rows returned.
    pub async fn page(
        &self,
        request: PageRequest,
    ) -> Result<Page<ProductListing>, ProductStoreError> {
        let mut tx = self.pool.begin().await?;

        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products")
            .fetch_one(&mut *tx)
            .await?;

        let rows = sqlx::query_as::<_, ProductListingRow>(
            r#"
SELECT p.id,
       p.name,
       p.category_id,
       c.name AS category_name
  FROM products AS p
  LEFT JOIN categories AS c
    ON c.id = p.category_id
 ORDER BY p.id ASC
 LIMIT ? OFFSET ?
            "#,
        )
        .bind(i64::from(request.size()))
        .bind(i64::try_from(request.offset()).unwrap_or(i64::MAX))
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        let items = rows.into_iter().map(ProductListingRow::into_domain).collect();
        Ok(Page::new(
            request,
            items,
            u64::try_from(total.0).unwrap_or_default(),
        ))
    }

    /// Loads a single product.
    pub async fn find(&self, id: i64) -> Result<Option<Product>, ProductStoreError> {
        let row = sqlx::query_as::<_, ProductRow>(
            "SELECT id, name, category_id FROM products WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ProductRow::into_domain))
    }

    /// Inserts a product. The store assigns `max(id) + 1`, or 1 for an empty table.
    pub async fn insert(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        input: &ProductInput,
    ) -> Result<Product, ProductStoreError> {
        let row = sqlx::query_as::<_, ProductRow>(
            "INSERT INTO products (name, category_id) VALUES (?, ?) \
             RETURNING id, name, category_id",
        )
        .bind(&input.name)
        .bind(input.category_id)
        .fetch_one(&mut **tx)
        .await
        .map_err(|err| map_write_error(err, input.category_id))?;

        Ok(row.into_domain())
    }

    /// Overwrites name and category of an existing product.
    pub async fn update(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        id: i64,
        input: &ProductInput,
    ) -> Result<Product, ProductStoreError> {
        let row = sqlx::query_as::<_, ProductRow>(
            "UPDATE products SET name = ?, category_id = ? WHERE id = ? \
             RETURNING id, name, category_id",
        )
        .bind(&input.name)
        .bind(input.category_id)
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|err| map_write_error(err, input.category_id))?;

        row.map(ProductRow::into_domain)
            .ok_or(ProductStoreError::NotFound)
    }

    /// Deletes a product by id.
    pub async fn delete(&self, id: i64) -> Result<(), ProductStoreError> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ProductStoreError::NotFound);
        }
        Ok(())
    }
}

fn map_write_error(err: sqlx::Error, category_id: i64) -> ProductStoreError {
    match constraint_violation(&err) {
        Some(ConstraintViolation::Unique) => ProductStoreError::Duplicate,
        Some(ConstraintViolation::ForeignKey) => ProductStoreError::UnknownCategory(category_id),
        None => ProductStoreError::Database(err),
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    category_id: i64,
}

impl ProductRow {
    fn into_domain(self) -> Product {
        Product {
            id: self.id,
            name: self.name,
            category_id: self.category_id,
        }
    }
}

/// Product row joined with the referenced category name.
#[derive(Debug, sqlx::FromRow)]
struct ProductListingRow {
    id: i64,
    name: String,
    category_id: i64,
    category_name: Option<String>,
}

impl ProductListingRow {
    fn into_domain(self) -> ProductListing {
        let category = self.category_name.map(|name| Category {
            id: self.category_id,
            name,
        });
        ProductListing {
            id: self.id,
            name: self.name,
            category_id: self.category_id,
            category,
        }
    }
}

/// Errors that can occur while reading or mutating products.
#[derive(Debug, Error)]
pub enum ProductStoreError {
    #[error("a product with the same name already exists")]
    Duplicate,
    #[error("product not found")]
    NotFound,
    #[error("category {0} does not exist")]
    UnknownCategory(i64),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}
