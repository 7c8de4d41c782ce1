use crate::domain::error::{AppError, AppResult};
use crate::domain::item::Item;
use crate::transport::http::types::{invalid_body, AppState, ErrorBody, ItemListQuery, MessageResponse};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;

fn item_body(request: Result<Json<Item>, JsonRejection>) -> AppResult<Item> {
    let Json(item) = request.map_err(|e| invalid_body(e, "item"))?;
    if item == Item::default() {
        return Err(AppError::bad_request("invalid item body"));
    }
    Ok(item)
}

#[utoipa::path(
    get,
    path = "/items",
    params(ItemListQuery),
    responses(
        (status = 200, description = "Items matching the filter", body = [Item]),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn list_items_handler(
    State(state): State<AppState>,
    Query(query): Query<ItemListQuery>,
) -> AppResult<Json<Vec<Item>>> {
    let page = query.page();
    let items = state
        .items
        .get_all(page.count, page.offset, &query.specification())
        .await?;
    Ok(Json(items))
}

#[utoipa::path(
    post,
    path = "/items",
    request_body = Item,
    responses(
        (status = 201, description = "Item created", body = Item),
        (status = 400, description = "Bad request", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn create_item_handler(
    State(state): State<AppState>,
    request: Result<Json<Item>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Item>)> {
    let item = item_body(request)?;
    let created = state.items.create(item).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    put,
    path = "/items/{id}",
    params(("id" = String, Path, description = "Item id")),
    request_body = Item,
    responses(
        (status = 200, description = "Item updated", body = Item),
        (status = 400, description = "Bad request", body = ErrorBody),
        (status = 404, description = "No such item", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn update_item_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    request: Result<Json<Item>, JsonRejection>,
) -> AppResult<Json<Item>> {
    let mut item = item_body(request)?;
    item.id = id;
    let updated = state.items.update(item).await?;
    Ok(Json(updated))
}

#[utoipa::path(
    delete,
    path = "/items/{id}",
    params(("id" = String, Path, description = "Item id")),
    responses(
        (status = 200, description = "Item deleted", body = MessageResponse),
        (status = 400, description = "Item still has inventory", body = ErrorBody),
        (status = 404, description = "No such item", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn delete_item_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    state.items.delete(&id).await?;
    Ok(Json(MessageResponse::new("deleted successfully")))
}
