use serde::Serialize;
use tracing::info;

use catalog_core::paging::PageRequest;
use catalog_core::types::{Category, Product, ProductListing};
use catalog_core::validation::{product_input, ValidationError};
use catalog_storage::{Database, ProductStoreError};

use crate::error::{CatalogError, Entity};
use crate::telemetry::observe_mutation;

const DUPLICATE_PRODUCT: &str = "Product already exists.";

/// One page of products plus the categories a list view needs for filters
/// and dropdowns.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    pub products: Vec<ProductListing>,
    pub categories: Vec<Category>,
    pub current_page: u32,
    pub total_pages: u64,
    pub total_items: u64,
}

/// Paged listing and CRUD for products.
///
/// Ids come from the store's rowid allocation, which hands out
/// `max(id) + 1` atomically. Names are unique and compared case-sensitively.
#[derive(Clone)]
pub struct ProductService {
    database: Database,
}

impl ProductService {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    pub async fn list(&self, request: PageRequest) -> Result<ProductPage, CatalogError> {
        let page = self
            .database
            .products()
            .page(request)
            .await
            .map_err(persistence)?;
        let categories = self.categories().await?;

        Ok(ProductPage {
            products: page.items,
            categories,
            current_page: page.current_page,
            total_pages: page.total_pages,
            total_items: page.total_items,
        })
    }

    /// Categories offered in the product forms.
    pub async fn categories(&self) -> Result<Vec<Category>, CatalogError> {
        self.database
            .categories()
            .list_all()
            .await
            .map_err(persistence)
    }

    pub async fn get(&self, id: i64) -> Result<Product, CatalogError> {
        self.database
            .products()
            .find(id)
            .await
            .map_err(persistence)?
            .ok_or_else(|| CatalogError::not_found(Entity::Product, id))
    }

    pub async fn create(&self, name: &str, category_id: i64) -> Result<Product, CatalogError> {
        observe_mutation(
            Entity::Product,
            "create",
            self.try_create(name, category_id).await,
        )
    }

    pub async fn update(
        &self,
        id: i64,
        name: &str,
        category_id: i64,
    ) -> Result<Product, CatalogError> {
        observe_mutation(
            Entity::Product,
            "update",
            self.try_update(id, name, category_id).await,
        )
    }

    pub async fn delete(&self, id: i64) -> Result<(), CatalogError> {
        observe_mutation(Entity::Product, "delete", self.try_delete(id).await)
    }

    async fn try_create(&self, name: &str, category_id: i64) -> Result<Product, CatalogError> {
        let input = product_input(name, category_id)?;
        let repo = self.database.products();
        let mut tx = repo.begin().await.map_err(persistence)?;

        let product = repo
            .insert(&mut tx, &input)
            .await
            .map_err(|err| store_error(err, None))?;
        tx.commit().await.map_err(persistence)?;

        info!(
            stage = "product",
            id = product.id,
            name = %product.name,
            category_id = product.category_id,
            "product created"
        );
        Ok(product)
    }

    async fn try_update(
        &self,
        id: i64,
        name: &str,
        category_id: i64,
    ) -> Result<Product, CatalogError> {
        let input = product_input(name, category_id)?;
        let repo = self.database.products();
        let mut tx = repo.begin().await.map_err(persistence)?;

        let product = repo
            .update(&mut tx, id, &input)
            .await
            .map_err(|err| store_error(err, Some(id)))?;
        tx.commit().await.map_err(persistence)?;

        info!(
            stage = "product",
            id,
            name = %product.name,
            category_id = product.category_id,
            "product updated"
        );
        Ok(product)
    }

    async fn try_delete(&self, id: i64) -> Result<(), CatalogError> {
        self.database
            .products()
            .delete(id)
            .await
            .map_err(|err| store_error(err, Some(id)))?;

        info!(stage = "product", id, "product deleted");
        Ok(())
    }
}

fn persistence(err: impl std::fmt::Display) -> CatalogError {
    CatalogError::persistence(Entity::Product, err)
}

fn store_error(err: ProductStoreError, id: Option<i64>) -> CatalogError {
    match (err, id) {
        (ProductStoreError::Duplicate, _) => CatalogError::Conflict(DUPLICATE_PRODUCT.to_string()),
        (ProductStoreError::UnknownCategory(category_id), _) => {
            ValidationError::UnknownCategory(category_id).into()
        }
        (ProductStoreError::NotFound, Some(id)) => CatalogError::not_found(Entity::Product, id),
        (other, _) => persistence(other),
    }
}
