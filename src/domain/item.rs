//! Catalog items.

use crate::domain::specification::ItemSpecification;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A catalog product record.
///
/// Every field defaults so that partial request bodies deserialize; the
/// use cases decide which fields are mandatory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct Item {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Item {
    /// An item payload that carries only a reference to a stored item.
    pub fn reference(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }
}

/// Persistence contract for catalog items.
///
/// Lookups return `Ok(None)` when no row matches; errors are reserved for
/// storage failures.
#[async_trait]
pub trait ItemRepository: Send + Sync {
    async fn get_all(
        &self,
        count: i64,
        offset: i64,
        filter: &ItemSpecification,
    ) -> anyhow::Result<Vec<Item>>;

    async fn get_one(&self, id: &str) -> anyhow::Result<Option<Item>>;

    async fn save(&self, item: &Item) -> anyhow::Result<Item>;

    /// Updates name, description, price and `updated_at`. `created_at` is never rewritten.
    async fn edit(&self, item: &Item) -> anyhow::Result<Item>;

    async fn delete(&self, id: &str) -> anyhow::Result<()>;
}
