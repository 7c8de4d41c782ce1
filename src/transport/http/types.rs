use crate::app::{InventoryService, ItemService};
use crate::domain::error::AppError;
use crate::domain::specification::{InventorySpecification, ItemSpecification};
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

pub const DEFAULT_PAGE_SIZE: i64 = 20;

#[derive(Clone)]
pub struct AppState {
    pub items: ItemService,
    pub inventory: InventoryService,
}

/// Error payload; `code` mirrors the HTTP status.
#[derive(Serialize, Deserialize, Debug, ToSchema, PartialEq, Eq)]
pub struct ErrorBody {
    pub code: u16,
    pub message: String,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorBody {
            code: status.as_u16(),
            message: self.message().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Maps a body that failed to deserialize onto a 400.
pub fn invalid_body(err: JsonRejection, what: &str) -> AppError {
    AppError::bad_request(format!("invalid {} body: {}", what, err.body_text()))
}

/// `count`/`offset` window. Unparseable or negative values fall back to the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub count: i64,
    pub offset: i64,
}

impl Page {
    pub fn from_params(count: Option<&str>, offset: Option<&str>) -> Self {
        let parse = |raw: Option<&str>, default: i64| {
            raw.and_then(|v| v.trim().parse::<i64>().ok())
                .filter(|v| *v >= 0)
                .unwrap_or(default)
        };
        Self {
            count: parse(count, DEFAULT_PAGE_SIZE),
            offset: parse(offset, 0),
        }
    }
}

/// Query string of `GET /items`. Numeric values are taken as raw strings so
/// that unparseable input degrades to the permissive defaults instead of a 400.
#[derive(Deserialize, Debug, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ItemListQuery {
    /// Case-insensitive substring of the item name.
    pub name: Option<String>,
    /// Case-insensitive substring of the item description.
    pub description: Option<String>,
    #[serde(rename = "min-price")]
    pub min_price: Option<String>,
    /// Absent, unparseable or negative means unbounded.
    #[serde(rename = "max-price")]
    pub max_price: Option<String>,
    /// Page size (default 20).
    pub count: Option<String>,
    /// Rows to skip (default 0).
    pub offset: Option<String>,
}

impl ItemListQuery {
    pub fn specification(&self) -> ItemSpecification {
        ItemSpecification::from_params(
            self.name.as_deref(),
            self.description.as_deref(),
            self.min_price.as_deref(),
            self.max_price.as_deref(),
        )
    }

    pub fn page(&self) -> Page {
        Page::from_params(self.count.as_deref(), self.offset.as_deref())
    }
}

/// Query string of `GET /inventory`: the item filters plus a quantity range.
#[derive(Deserialize, Debug, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct InventoryListQuery {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "min-price")]
    pub min_price: Option<String>,
    #[serde(rename = "max-price")]
    pub max_price: Option<String>,
    #[serde(rename = "min-quantity")]
    pub min_quantity: Option<String>,
    /// Absent, unparseable or negative means unbounded.
    #[serde(rename = "max-quantity")]
    pub max_quantity: Option<String>,
    pub count: Option<String>,
    pub offset: Option<String>,
}

impl InventoryListQuery {
    pub fn specification(&self) -> InventorySpecification {
        let item = ItemSpecification::from_params(
            self.name.as_deref(),
            self.description.as_deref(),
            self.min_price.as_deref(),
            self.max_price.as_deref(),
        );
        InventorySpecification::from_params(
            self.min_quantity.as_deref(),
            self.max_quantity.as_deref(),
            item,
        )
    }

    pub fn page(&self) -> Page {
        Page::from_params(self.count.as_deref(), self.offset.as_deref())
    }
}
