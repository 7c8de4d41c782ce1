use crate::domain::error::{AppError, AppResult};
use crate::domain::inventory::InventoryItem;
use crate::transport::http::types::{
    invalid_body, AppState, ErrorBody, InventoryListQuery, MessageResponse,
};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;

#[utoipa::path(
    get,
    path = "/inventory",
    params(InventoryListQuery),
    responses(
        (status = 200, description = "Inventory with item details", body = [InventoryItem]),
        (status = 404, description = "Nothing matches the filter", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn list_inventory_handler(
    State(state): State<AppState>,
    Query(query): Query<InventoryListQuery>,
) -> AppResult<Json<Vec<InventoryItem>>> {
    let page = query.page();
    let records = state
        .inventory
        .get_all(page.count, page.offset, &query.specification())
        .await?;
    Ok(Json(records))
}

#[utoipa::path(
    get,
    path = "/inventory/{id}",
    params(("id" = String, Path, description = "Item id")),
    responses(
        (status = 200, description = "Inventory for the item", body = InventoryItem),
        (status = 404, description = "Item has no inventory", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn get_inventory_for_item_handler(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
) -> AppResult<Json<InventoryItem>> {
    let record = state.inventory.get_inventory_for_item(&item_id).await?;
    Ok(Json(record))
}

#[utoipa::path(
    post,
    path = "/inventory",
    request_body = InventoryItem,
    responses(
        (status = 201, description = "Inventory created or updated", body = InventoryItem),
        (status = 400, description = "Bad request", body = ErrorBody),
        (status = 404, description = "Referenced item does not exist", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn create_or_update_inventory_handler(
    State(state): State<AppState>,
    request: Result<Json<InventoryItem>, JsonRejection>,
) -> AppResult<(StatusCode, Json<InventoryItem>)> {
    let Json(inventory) = request.map_err(|e| invalid_body(e, "inventory"))?;
    if inventory == InventoryItem::default() {
        return Err(AppError::bad_request("invalid inventory body"));
    }
    let saved = state.inventory.update_inventory_item(inventory).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

#[utoipa::path(
    delete,
    path = "/inventory/{id}",
    params(("id" = String, Path, description = "Inventory id")),
    responses(
        (status = 200, description = "Inventory deleted", body = MessageResponse),
        (status = 404, description = "No such inventory", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn delete_inventory_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    state.inventory.delete_item(&id).await?;
    Ok(Json(MessageResponse::new("deleted successfully")))
}
