use axum::{
    body::Body,
    http::{header, Method, Request, Response},
    Router,
};
use http_body_util::BodyExt;
use tower::ServiceExt;

use catalog_storage::Database;

use crate::router::{app_router, AppState};
use crate::telemetry;

pub async fn setup_database() -> Database {
    let database = Database::connect("sqlite::memory:")
        .await
        .expect("connect");
    database.run_migrations().await.expect("migrations");
    database
}

/// Migrated database in a file under `dir`, for tests that need several
/// connections writing at once.
pub async fn setup_file_database(dir: &tempfile::TempDir) -> Database {
    let url = format!(
        "sqlite://{}?mode=rwc",
        dir.path().join("catalog.db").display()
    );
    let database = Database::connect(&url).await.expect("connect");
    database.run_migrations().await.expect("migrations");
    database
}

pub async fn seed_category(database: &Database, name: &str) -> i64 {
    let row: (i64,) =
        sqlx::query_as("INSERT INTO categories (name, name_key) VALUES (?, ?) RETURNING id")
            .bind(name)
            .bind(name.to_lowercase())
            .fetch_one(database.pool())
            .await
            .expect("seed category");
    row.0
}

pub async fn seed_product(database: &Database, name: &str, category_id: i64) -> i64 {
    let row: (i64,) =
        sqlx::query_as("INSERT INTO products (name, category_id) VALUES (?, ?) RETURNING id")
            .bind(name)
            .bind(category_id)
            .fetch_one(database.pool())
            .await
            .expect("seed product");
    row.0
}

pub async fn setup_state() -> AppState {
    let metrics = telemetry::init_metrics().expect("metrics init");
    AppState::new(metrics, setup_database().await)
}

pub async fn setup_app() -> (Router, Database) {
    let state = setup_state().await;
    let database = state.storage().clone();
    (app_router(state), database)
}

pub async fn send(app: &Router, method: Method, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request");
    app.clone().oneshot(request).await.expect("handler should respond")
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri).await
}

pub async fn post_form(app: &Router, uri: &str, fields: &[(&str, &str)]) -> Response<Body> {
    let body = serde_urlencoded::to_string(fields).expect("encode form");
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .expect("request");
    app.clone().oneshot(request).await.expect("handler should respond")
}

pub async fn body_text(response: Response<Body>) -> String {
    let collected = response
        .into_body()
        .collect()
        .await
        .expect("body should read");
    String::from_utf8(collected.to_bytes().to_vec()).expect("utf-8")
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_str(&body_text(response).await).expect("json body")
}

pub fn location(response: &Response<Body>) -> &str {
    response.headers()[header::LOCATION]
        .to_str()
        .expect("ascii location")
}
