pub mod app;
pub mod domain;
pub mod infra;
pub mod storage;
pub mod transport;

// Convenience re-exports (keeps call-sites clean)
pub use app::{InventoryService, ItemService};
pub use domain::{AppError, InventoryItem, Item};
pub use infra::config::{Config, StorageBackend};
pub use storage::MemoryStore;

use crate::domain::{InventoryRepository, ItemRepository};
use std::sync::Arc;

/// Builds the HTTP state over a pair of repositories, applying the
/// configured deadlines and delete behaviour.
pub fn build_state(
    config: &Config,
    items: Arc<dyn ItemRepository>,
    inventory: Arc<dyn InventoryRepository>,
) -> transport::http::AppState {
    transport::http::AppState {
        items: ItemService::new(Arc::clone(&items), config.item_timeout),
        inventory: InventoryService::new(items, inventory, config.inventory_timeout)
            .with_cascade_item_delete(config.cascade_item_delete),
    }
}
