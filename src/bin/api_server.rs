// src/bin/api_server.rs

use std::sync::Arc;
use storefront_inventory::domain::{InventoryRepository, ItemRepository};
use storefront_inventory::infra::telemetry;
use storefront_inventory::storage::postgres;
use storefront_inventory::{build_state, transport, Config, MemoryStore, StorageBackend};
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    telemetry::init();

    // --- Storage Initialization ---
    let (items, inventory): (Arc<dyn ItemRepository>, Arc<dyn InventoryRepository>) =
        match config.storage_backend {
            StorageBackend::Postgres => {
                let database_url = config
                    .database_url
                    .as_deref()
                    .ok_or_else(|| anyhow::anyhow!("DATABASE_URL must be set"))?;
                let pool = postgres::connect(database_url, config.db_max_connections).await?;
                postgres::ensure_schema(&pool).await?;
                tracing::info!("connected to postgres, schema ready");
                let items: Arc<dyn ItemRepository> =
                    Arc::new(postgres::PgItemRepository::new(pool.clone()));
                let inventory: Arc<dyn InventoryRepository> =
                    Arc::new(postgres::PgInventoryRepository::new(pool));
                (items, inventory)
            }
            StorageBackend::Memory => {
                tracing::warn!("using the in-memory store; data is lost on exit");
                let store = Arc::new(MemoryStore::new());
                let items: Arc<dyn ItemRepository> = store.clone();
                let inventory: Arc<dyn InventoryRepository> = store;
                (items, inventory)
            }
        };

    let app_state = build_state(&config, items, inventory);

    // --- API Server Initialization ---
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let app = transport::http::create_router(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", transport::http::ApiDoc::openapi()))
        .layer(cors);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "API server listening (Swagger UI at /swagger-ui)");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for shutdown signal");
            }
            tracing::info!("shutdown signal received");
        })
        .await?;

    Ok(())
}
