use crate::domain::inventory::InventoryItem;
use crate::domain::item::Item;
use crate::transport::http::handlers::{health, inventory, items};
use crate::transport::http::types::{ErrorBody, MessageResponse};
use axum::routing::{get, put};
use axum::Router;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthcheck_handler,
        items::list_items_handler,
        items::create_item_handler,
        items::update_item_handler,
        items::delete_item_handler,
        inventory::list_inventory_handler,
        inventory::get_inventory_for_item_handler,
        inventory::create_or_update_inventory_handler,
        inventory::delete_inventory_handler
    ),
    components(schemas(Item, InventoryItem, ErrorBody, MessageResponse))
)]
pub struct ApiDoc;

pub fn create_router(app_state: crate::transport::http::types::AppState) -> Router {
    Router::new()
        .route("/health", get(health::healthcheck_handler))
        .route(
            "/items",
            get(items::list_items_handler).post(items::create_item_handler),
        )
        .route(
            "/items/:id",
            put(items::update_item_handler).delete(items::delete_item_handler),
        )
        .route(
            "/inventory",
            get(inventory::list_inventory_handler).post(inventory::create_or_update_inventory_handler),
        )
        .route(
            "/inventory/:id",
            get(inventory::get_inventory_for_item_handler).delete(inventory::delete_inventory_handler),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
