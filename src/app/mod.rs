//! Use cases: item CRUD, inventory reconciliation, and item-detail hydration.

use crate::domain::error::AppResult;
use std::future::Future;
use std::time::Duration;

pub mod hydrator;
pub mod inventory_service;
pub mod item_service;

pub use inventory_service::InventoryService;
pub use item_service::ItemService;

/// Runs `work` under a deadline. On expiry the in-flight future is dropped,
/// which cancels its storage calls, and the caller gets an internal error.
pub(crate) async fn within<T>(
    budget: Duration,
    work: impl Future<Output = AppResult<T>>,
) -> AppResult<T> {
    tokio::time::timeout(budget, work).await?
}
