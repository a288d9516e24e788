use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Form, Json,
};
use serde::{Deserialize, Serialize};

use catalog_core::paging::PageRequest;
use catalog_core::types::{Category, Product};
use catalog_core::validation::{parse_id, validate_product, ValidationErrors};

use crate::error::{CatalogError, Entity};
use crate::problem::ProblemResponse;
use crate::product::ProductPage;
use crate::router::{path_id, redirect_found, AppState};
use crate::telemetry::record_page_request;

const LIST_LOCATION: &str = "/product";

/// Product create and update form. `productId` is empty on create.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFormView {
    pub product_id: Option<i64>,
    pub product_name: String,
    pub category_id: Option<i64>,
    pub categories: Vec<Category>,
    pub errors: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    page_number: Option<i64>,
    page_size: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProductForm {
    product_id: Option<String>,
    product_name: Option<String>,
    category_id: Option<String>,
}

impl ProductForm {
    /// Echoes the submitted values back into a form view.
    fn into_view(self, categories: Vec<Category>, errors: Vec<String>) -> ProductFormView {
        ProductFormView {
            product_id: self.product_id.as_deref().and_then(|raw| parse_id(Some(raw)).ok()),
            product_name: self.product_name.unwrap_or_default(),
            category_id: self
                .category_id
                .as_deref()
                .and_then(|raw| raw.trim().parse().ok()),
            categories,
            errors,
        }
    }
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<ProductPage>, ProblemResponse> {
    record_page_request(Entity::Product);
    let request = PageRequest::from_query(query.page_number, query.page_size)
        .map_err(CatalogError::from)?;
    Ok(Json(state.products().list(request).await?))
}

pub async fn create_form(
    State(state): State<AppState>,
) -> Result<Json<ProductFormView>, ProblemResponse> {
    let categories = state.products().categories().await?;
    Ok(Json(ProductFormView {
        categories,
        ..ProductFormView::default()
    }))
}

pub async fn create(
    State(state): State<AppState>,
    Form(form): Form<ProductForm>,
) -> Result<Response, ProblemResponse> {
    let service = state.products();
    let input = match validate_product(form.product_name.as_deref(), form.category_id.as_deref()) {
        Ok(input) => input,
        Err(errors) => return rerender(&state, form, errors.into()).await,
    };

    match service.create(&input.name, input.category_id).await {
        Ok(_) => Ok(redirect_found(LIST_LOCATION)),
        Err(err @ CatalogError::Conflict(_)) => Err(err.into()),
        Err(err) => rerender(&state, form, err).await,
    }
}

pub async fn delete_confirm(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Json<Product>, ProblemResponse> {
    let id = path_id(&raw)?;
    Ok(Json(state.products().get(id).await?))
}

/// Deletes a product. A missing id answers 409 rather than 404.
pub async fn delete(State(state): State<AppState>, Path(raw): Path<String>) -> Response {
    let id = match path_id(&raw) {
        Ok(id) => id,
        Err(problem) => return problem.into_response(),
    };
    match state.products().delete(id).await {
        Ok(()) => (StatusCode::OK, format!("{id} deleted successfully")).into_response(),
        Err(CatalogError::NotFound { .. }) => {
            ProblemResponse::conflict(format!("{id} does not exist.")).into_response()
        }
        Err(err) => ProblemResponse::from(err).into_response(),
    }
}

pub async fn update_form(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Json<ProductFormView>, ProblemResponse> {
    let id = path_id(&raw)?;
    let service = state.products();
    let product = service.get(id).await?;
    let categories = service.categories().await?;
    Ok(Json(ProductFormView {
        product_id: Some(product.id),
        product_name: product.name,
        category_id: Some(product.category_id),
        categories,
        errors: Vec::new(),
    }))
}

pub async fn update(
    State(state): State<AppState>,
    Form(form): Form<ProductForm>,
) -> Result<Response, ProblemResponse> {
    let mut errors = ValidationErrors::new();
    let id = parse_id(form.product_id.as_deref()).map_err(|err| errors.push(err)).ok();
    let input = validate_product(form.product_name.as_deref(), form.category_id.as_deref())
        .map_err(|invalid| invalid.iter().cloned().for_each(|err| errors.push(err)))
        .ok();

    let (Some(id), Some(input)) = (id, input) else {
        return rerender(&state, form, errors.into()).await;
    };

    match state
        .products()
        .update(id, &input.name, input.category_id)
        .await
    {
        Ok(_) => Ok(redirect_found(LIST_LOCATION)),
        Err(err @ (CatalogError::NotFound { .. } | CatalogError::Conflict(_))) => Err(err.into()),
        Err(err) => rerender(&state, form, err).await,
    }
}

async fn rerender(
    state: &AppState,
    form: ProductForm,
    err: CatalogError,
) -> Result<Response, ProblemResponse> {
    let categories = state.products().categories().await?;
    Ok(Json(form.into_view(categories, err.user_messages())).into_response())
}
