use tracing::info;

use catalog_core::types::Category;
use catalog_core::validation::validate_category;
use catalog_storage::{CategoryStoreError, Database};

use crate::error::{CatalogError, Entity};
use crate::telemetry::observe_mutation;

/// Lists, creates, renames and deletes categories.
///
/// Name uniqueness ignores letter case and is enforced by the unique index on
/// `name_key` within the single insert or update, so concurrent writers see
/// either success or a duplicate. Categories still referenced by a product
/// cannot be deleted.
#[derive(Clone)]
pub struct CategoryService {
    database: Database,
}

impl CategoryService {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    pub async fn list(&self) -> Result<Vec<Category>, CatalogError> {
        self.database
            .categories()
            .list_all()
            .await
            .map_err(|err| CatalogError::persistence(Entity::Category, err))
    }

    pub async fn get(&self, id: i64) -> Result<Category, CatalogError> {
        self.database
            .categories()
            .find(id)
            .await
            .map_err(|err| CatalogError::persistence(Entity::Category, err))?
            .ok_or_else(|| CatalogError::not_found(Entity::Category, id))
    }

    pub async fn create(&self, name: &str) -> Result<Category, CatalogError> {
        observe_mutation(Entity::Category, "create", self.try_create(name).await)
    }

    pub async fn edit(&self, id: i64, name: &str) -> Result<Category, CatalogError> {
        observe_mutation(Entity::Category, "edit", self.try_edit(id, name).await)
    }

    pub async fn delete(&self, id: i64) -> Result<(), CatalogError> {
        observe_mutation(Entity::Category, "delete", self.try_delete(id).await)
    }

    async fn try_create(&self, name: &str) -> Result<Category, CatalogError> {
        let input = validate_category(Some(name))?;
        let repo = self.database.categories();
        let mut tx = repo.begin().await.map_err(persistence)?;

        let category = repo
            .insert(&mut tx, &input)
            .await
            .map_err(|err| store_error(err, &input.name, None))?;
        tx.commit().await.map_err(persistence)?;

        info!(stage = "category", id = category.id, name = %category.name, "category created");
        Ok(category)
    }

    async fn try_edit(&self, id: i64, name: &str) -> Result<Category, CatalogError> {
        let input = validate_category(Some(name))?;
        let repo = self.database.categories();
        let mut tx = repo.begin().await.map_err(persistence)?;

        let category = repo
            .rename(&mut tx, id, &input)
            .await
            .map_err(|err| store_error(err, &input.name, Some(id)))?;
        tx.commit().await.map_err(persistence)?;

        info!(stage = "category", id, name = %category.name, "category renamed");
        Ok(category)
    }

    async fn try_delete(&self, id: i64) -> Result<(), CatalogError> {
        let repo = self.database.categories();
        let mut tx = repo.begin().await.map_err(persistence)?;

        match repo.delete(&mut tx, id).await {
            Ok(()) => {}
            Err(CategoryStoreError::Referenced) => {
                tx.rollback().await.map_err(persistence)?;
                let referencing = repo.count_products(id).await.map_err(persistence)?;
                return Err(in_use(id, referencing));
            }
            Err(err) => return Err(store_error(err, "", Some(id))),
        }
        tx.commit().await.map_err(persistence)?;

        info!(stage = "category", id, "category deleted");
        Ok(())
    }
}

fn persistence(err: impl std::fmt::Display) -> CatalogError {
    CatalogError::persistence(Entity::Category, err)
}

fn in_use(id: i64, products: i64) -> CatalogError {
    CatalogError::Conflict(format!(
        "Category {id} cannot be deleted while {products} product(s) reference it."
    ))
}

fn store_error(err: CategoryStoreError, name: &str, id: Option<i64>) -> CatalogError {
    match (err, id) {
        (CategoryStoreError::Duplicate, _) => CatalogError::Duplicate(name.to_string()),
        (CategoryStoreError::NotFound, Some(id)) => CatalogError::not_found(Entity::Category, id),
        (other, _) => persistence(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        seed_category, seed_product, setup_database, setup_file_database,
    };

    #[tokio::test]
    async fn create_rejects_name_in_any_casing() {
        let database = setup_database().await;
        seed_category(&database, "Tools").await;
        let service = CategoryService::new(database);

        let err = service.create("tools").await.expect_err("duplicate");
        assert!(matches!(err, CatalogError::Duplicate(ref name) if name == "tools"));
        assert_eq!(service.list().await.expect("list").len(), 1);

        let parts = service.create("Parts").await.expect("create");
        assert_eq!(parts.name, "Parts");
        assert_eq!(service.list().await.expect("list").len(), 2);
    }

    #[tokio::test]
    async fn concurrent_creates_differing_in_case_yield_one_duplicate() {
        let dir = tempfile::tempdir().expect("tempdir");
        let service = CategoryService::new(setup_file_database(&dir).await);

        for round in 0..10 {
            let upper = format!("N{round}");
            let lower = format!("n{round}");
            let (first, second) = tokio::join!(service.create(&upper), service.create(&lower));

            let outcomes = [first, second];
            assert_eq!(outcomes.iter().filter(|outcome| outcome.is_ok()).count(), 1);
            assert!(outcomes
                .iter()
                .any(|outcome| matches!(outcome, Err(CatalogError::Duplicate(_)))));
        }
        assert_eq!(service.list().await.expect("list").len(), 10);
    }

    #[tokio::test]
    async fn create_rejects_blank_name() {
        let service = CategoryService::new(setup_database().await);

        let err = service.create("  ").await.expect_err("blank");
        assert!(matches!(err, CatalogError::Validation(_)));
        assert!(service.list().await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn get_missing_category_is_not_found() {
        let service = CategoryService::new(setup_database().await);
        let err = service.get(3).await.expect_err("missing");
        assert!(matches!(
            err,
            CatalogError::NotFound {
                entity: Entity::Category,
                id: 3
            }
        ));
    }

    #[tokio::test]
    async fn edit_overwrites_name() {
        let database = setup_database().await;
        let id = seed_category(&database, "Tols").await;
        let service = CategoryService::new(database);

        let edited = service.edit(id, "Tools").await.expect("edit");
        assert_eq!(edited, Category { id, name: "Tools".to_string() });
        assert_eq!(service.get(id).await.expect("get").name, "Tools");
    }

    #[tokio::test]
    async fn edit_may_change_casing_of_own_name() {
        let database = setup_database().await;
        let id = seed_category(&database, "tools").await;
        let service = CategoryService::new(database);

        let edited = service.edit(id, "TOOLS").await.expect("edit");
        assert_eq!(edited.name, "TOOLS");
    }

    #[tokio::test]
    async fn edit_rejects_name_of_another_category() {
        let database = setup_database().await;
        seed_category(&database, "Tools").await;
        let parts = seed_category(&database, "Parts").await;
        let service = CategoryService::new(database);

        let err = service.edit(parts, "TOOLS").await.expect_err("clash");
        assert!(matches!(err, CatalogError::Duplicate(_)));
        assert_eq!(service.get(parts).await.expect("get").name, "Parts");
    }

    #[tokio::test]
    async fn edit_missing_category_is_not_found() {
        let service = CategoryService::new(setup_database().await);
        let err = service.edit(8, "Tools").await.expect_err("missing");
        assert!(matches!(err, CatalogError::NotFound { id: 8, .. }));
    }

    #[tokio::test]
    async fn delete_missing_category_leaves_store_unchanged() {
        let database = setup_database().await;
        seed_category(&database, "Tools").await;
        let service = CategoryService::new(database);

        let err = service.delete(99).await.expect_err("missing");
        assert!(matches!(err, CatalogError::NotFound { id: 99, .. }));
        assert_eq!(service.list().await.expect("list").len(), 1);
    }

    #[tokio::test]
    async fn delete_is_restricted_while_products_reference_category() {
        let database = setup_database().await;
        let tools = seed_category(&database, "Tools").await;
        seed_product(&database, "Hammer", tools).await;
        seed_product(&database, "Wrench", tools).await;
        let service = CategoryService::new(database);

        let err = service.delete(tools).await.expect_err("in use");
        match err {
            CatalogError::Conflict(detail) => assert!(detail.contains("2 product(s)")),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(service.get(tools).await.is_ok());
    }

    #[tokio::test]
    async fn delete_unreferenced_category_removes_it() {
        let database = setup_database().await;
        let id = seed_category(&database, "Tools").await;
        let service = CategoryService::new(database);

        service.delete(id).await.expect("delete");
        assert!(service.list().await.expect("list").is_empty());
    }
}
