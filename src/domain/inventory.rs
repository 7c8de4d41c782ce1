//! Stock records.

use crate::domain::item::Item;
use crate::domain::specification::InventorySpecification;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Tracks the quantity in stock for exactly one [`Item`].
///
/// Storage only keeps `item.id`; read paths hydrate the remaining item fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct InventoryItem {
    pub id: String,
    pub item: Item,
    pub quantity: i32,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Persistence contract for inventory records.
#[async_trait]
pub trait InventoryRepository: Send + Sync {
    /// Returns the record bound to `item_id`, if any. At most one is expected.
    async fn get_inventory_for_item(&self, item_id: &str) -> anyhow::Result<Option<InventoryItem>>;

    /// Records come back with only `item.id` populated.
    async fn get_all(
        &self,
        count: i64,
        offset: i64,
        filter: &InventorySpecification,
    ) -> anyhow::Result<Vec<InventoryItem>>;

    async fn get_by_id(&self, id: &str) -> anyhow::Result<Option<InventoryItem>>;

    async fn save(&self, inventory: &InventoryItem) -> anyhow::Result<InventoryItem>;

    /// Persists `quantity` and `updated_at`. The item binding is immutable.
    async fn edit(&self, inventory: &InventoryItem) -> anyhow::Result<InventoryItem>;

    async fn delete(&self, id: &str) -> anyhow::Result<()>;

    /// Cheap connectivity probe used by the health endpoint.
    async fn ping(&self) -> anyhow::Result<()>;
}
