use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;

use catalog_core::validation::parse_id;
use catalog_storage::Database;

use crate::category::CategoryService;
use crate::error::CatalogError;
use crate::problem::ProblemResponse;
use crate::product::ProductService;
use crate::{category_pages, product_pages, telemetry};

#[derive(Clone)]
pub struct AppState {
    metrics: PrometheusHandle,
    storage: Database,
    categories: CategoryService,
    products: ProductService,
}

impl AppState {
    pub fn new(metrics: PrometheusHandle, storage: Database) -> Self {
        let categories = CategoryService::new(storage.clone());
        let products = ProductService::new(storage.clone());
        Self {
            metrics,
            storage,
            categories,
            products,
        }
    }

    pub fn metrics(&self) -> &PrometheusHandle {
        &self.metrics
    }

    pub fn storage(&self) -> &Database {
        &self.storage
    }

    pub fn categories(&self) -> &CategoryService {
        &self.categories
    }

    pub fn products(&self) -> &ProductService {
        &self.products
    }
}

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/metrics", get(metrics))
        .route("/category", get(category_pages::list))
        .route(
            "/category/create",
            get(category_pages::create_form).post(category_pages::create),
        )
        .route(
            "/category/delete/:id",
            get(category_pages::delete_confirm).post(category_pages::delete),
        )
        .route("/category/edit/:id", get(category_pages::edit_form))
        .route("/category/edit", post(category_pages::edit))
        .route("/product", get(product_pages::list))
        .route("/product/create", get(product_pages::create_form))
        .route("/product/addproduct", post(product_pages::create))
        .route("/product/delete/:id", get(product_pages::delete_confirm))
        .route("/product/:id", delete(product_pages::delete))
        .route("/product/update/:id", get(product_pages::update_form))
        .route("/product/updateproduct", post(product_pages::update))
        .with_state(state)
}

/// Parses the `:id` path segment, answering a problem response when it is not
/// an integer.
pub(crate) fn path_id(raw: &str) -> Result<i64, ProblemResponse> {
    parse_id(Some(raw)).map_err(|err| CatalogError::from(err).into())
}

/// `302 Found` pointing at `location`.
pub(crate) fn redirect_found(location: &'static str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    let body = telemetry::render_metrics(state.metrics());
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    )
}
