//! Item CRUD use cases.

use crate::app::within;
use crate::domain::error::{AppError, AppResult, ConstraintViolation};
use crate::domain::item::{Item, ItemRepository};
use crate::domain::specification::ItemSpecification;
use crate::domain::{new_id, now};
use std::sync::Arc;
use std::time::Duration;

/// Checks the fields every stored item must satisfy.
pub(crate) fn validate_item(item: &Item) -> AppResult<()> {
    if item.name.trim().is_empty() {
        return Err(AppError::bad_request("invalid request. Item name can't be empty"));
    }
    if !item.price.is_finite() || item.price < 0.0 {
        return Err(AppError::bad_request(
            "invalid request. Price can't be less than 0",
        ));
    }
    Ok(())
}

#[derive(Clone)]
pub struct ItemService {
    items: Arc<dyn ItemRepository>,
    timeout: Duration,
}

impl ItemService {
    pub fn new(items: Arc<dyn ItemRepository>, timeout: Duration) -> Self {
        Self { items, timeout }
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_all(
        &self,
        count: i64,
        offset: i64,
        filter: &ItemSpecification,
    ) -> AppResult<Vec<Item>> {
        within(self.timeout, self.list(count, offset, filter)).await
    }

    pub async fn get_one(&self, id: &str) -> AppResult<Item> {
        within(self.timeout, self.find(id)).await
    }

    #[tracing::instrument(skip(self, item), fields(name = %item.name))]
    pub async fn create(&self, item: Item) -> AppResult<Item> {
        within(self.timeout, self.create_inner(item)).await
    }

    #[tracing::instrument(skip(self, item), fields(id = %item.id))]
    pub async fn update(&self, item: Item) -> AppResult<Item> {
        within(self.timeout, self.update_inner(item)).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        within(self.timeout, self.delete_inner(id)).await
    }

    async fn list(
        &self,
        count: i64,
        offset: i64,
        filter: &ItemSpecification,
    ) -> AppResult<Vec<Item>> {
        Ok(self.items.get_all(count, offset, filter).await?)
    }

    async fn find(&self, id: &str) -> AppResult<Item> {
        self.items
            .get_one(id)
            .await?
            .ok_or_else(|| AppError::not_found("no such item exists"))
    }

    async fn create_inner(&self, mut item: Item) -> AppResult<Item> {
        validate_item(&item)?;
        let stamp = now();
        item.id = new_id();
        item.created_at = Some(stamp);
        item.updated_at = Some(stamp);
        let created = self.items.save(&item).await.map_err(|e| {
            tracing::error!(id = %item.id, error = %e, "failed to create item");
            AppError::from(e)
        })?;
        Ok(created)
    }

    async fn update_inner(&self, mut item: Item) -> AppResult<Item> {
        let existing = self.find(&item.id).await?;
        validate_item(&item)?;
        item.created_at = existing.created_at;
        item.updated_at = Some(now());
        Ok(self.items.edit(&item).await?)
    }

    async fn delete_inner(&self, id: &str) -> AppResult<()> {
        self.find(id).await?;
        self.items.delete(id).await.map_err(|e| {
            let stocked = matches!(
                ConstraintViolation::find(&e),
                Some(ConstraintViolation::ItemStillStocked(_))
            );
            if stocked {
                AppError::bad_request(
                    "invalid request. Item still has inventory; delete the inventory first",
                )
            } else {
                AppError::from(e)
            }
        })
    }
}
