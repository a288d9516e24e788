mod category;
mod category_pages;
mod error;
mod problem;
mod product;
mod product_pages;
mod router;
mod telemetry;
#[cfg(test)]
mod test_support;

use std::net::SocketAddr;

use catalog_storage::Database;
use catalog_util::{load_env_file, AppConfig};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    load_env_file();
    let config = AppConfig::from_env()?;

    telemetry::init_tracing(&config)?;
    let metrics = telemetry::init_metrics()?;

    let database =
        Database::connect_with(&config.database_url, config.db_max_connections).await?;
    database.run_migrations().await?;
    info!(
        stage = "app",
        max_connections = config.db_max_connections,
        "database ready"
    );

    let state = router::AppState::new(metrics, database);
    let storage = state.storage().clone();

    let addr: SocketAddr = config.bind_addr;
    info!(stage = "app", %addr, env = %config.environment.as_str(), "starting HTTP server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let served = axum::serve(listener, router::app_router(state)).await;
    storage.close().await;
    served.map_err(|err| err.into())
}
