use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    Form, Json,
};
use serde::{Deserialize, Serialize};

use catalog_core::types::Category;
use catalog_core::validation::parse_id;

use crate::error::{CatalogError, Entity};
use crate::problem::ProblemResponse;
use crate::router::{path_id, redirect_found, AppState};
use crate::telemetry::record_page_request;

const LIST_LOCATION: &str = "/category";
const CREATED_LOCATION: &str = "/category?notice=created";
const CREATED_NOTICE: &str = "Category successfully created!";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryListView {
    pub categories: Vec<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<&'static str>,
}

/// Create and edit form state, echoed back with messages when a post fails.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryFormView {
    pub category_id: Option<i64>,
    pub category_name: String,
    pub errors: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryEditView {
    pub category: Category,
    pub categories: Vec<Category>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    notice: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CategoryForm {
    category_id: Option<String>,
    category_name: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<CategoryListView>, ProblemResponse> {
    record_page_request(Entity::Category);
    let categories = state.categories().list().await?;
    let notice = match query.notice.as_deref() {
        Some("created") => Some(CREATED_NOTICE),
        _ => None,
    };
    Ok(Json(CategoryListView { categories, notice }))
}

pub async fn create_form() -> Json<CategoryFormView> {
    Json(CategoryFormView::default())
}

pub async fn create(State(state): State<AppState>, Form(form): Form<CategoryForm>) -> Response {
    let name = form.category_name.unwrap_or_default();
    match state.categories().create(&name).await {
        Ok(_) => redirect_found(CREATED_LOCATION),
        Err(err) => Json(CategoryFormView {
            category_id: None,
            category_name: name,
            errors: err.user_messages(),
        })
        .into_response(),
    }
}

pub async fn delete_confirm(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Json<Category>, ProblemResponse> {
    let id = path_id(&raw)?;
    Ok(Json(state.categories().get(id).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Response, ProblemResponse> {
    let id = path_id(&raw)?;
    state.categories().delete(id).await?;
    Ok(redirect_found(LIST_LOCATION))
}

pub async fn edit_form(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Json<CategoryEditView>, ProblemResponse> {
    let id = path_id(&raw)?;
    let service = state.categories();
    let category = service.get(id).await?;
    let categories = service.list().await?;
    Ok(Json(CategoryEditView {
        category,
        categories,
    }))
}

pub async fn edit(
    State(state): State<AppState>,
    Form(form): Form<CategoryForm>,
) -> Result<Response, ProblemResponse> {
    let name = form.category_name.unwrap_or_default();
    let id = match parse_id(form.category_id.as_deref()) {
        Ok(id) => id,
        Err(err) => {
            return Ok(Json(CategoryFormView {
                category_id: None,
                category_name: name,
                errors: vec![err.to_string()],
            })
            .into_response())
        }
    };

    match state.categories().edit(id, &name).await {
        Ok(_) => Ok(redirect_found(LIST_LOCATION)),
        Err(err @ CatalogError::NotFound { .. }) => Err(err.into()),
        Err(err) => Ok(Json(CategoryFormView {
            category_id: Some(id),
            category_name: name,
            errors: err.user_messages(),
        })
        .into_response()),
    }
}
