//! Inventory use cases, including the create-or-update reconciliation workflow.

use crate::app::hydrator::fill_item_details;
use crate::app::item_service::validate_item;
use crate::app::within;
use crate::domain::error::{AppError, AppResult, ConstraintViolation};
use crate::domain::inventory::{InventoryItem, InventoryRepository};
use crate::domain::item::ItemRepository;
use crate::domain::specification::InventorySpecification;
use crate::domain::{new_id, now};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct InventoryService {
    items: Arc<dyn ItemRepository>,
    inventory: Arc<dyn InventoryRepository>,
    timeout: Duration,
    /// Deleting an inventory record also deletes the item it tracks.
    cascade_item_delete: bool,
}

impl InventoryService {
    pub fn new(
        items: Arc<dyn ItemRepository>,
        inventory: Arc<dyn InventoryRepository>,
        timeout: Duration,
    ) -> Self {
        Self {
            items,
            inventory,
            timeout,
            cascade_item_delete: true,
        }
    }

    pub fn with_cascade_item_delete(mut self, cascade: bool) -> Self {
        self.cascade_item_delete = cascade;
        self
    }

    /// Lists inventory matching `filter`, with item details filled in.
    #[tracing::instrument(skip(self))]
    pub async fn get_all(
        &self,
        count: i64,
        offset: i64,
        filter: &InventorySpecification,
    ) -> AppResult<Vec<InventoryItem>> {
        within(self.timeout, self.list(count, offset, filter)).await
    }

    /// Returns the inventory record tracking `item_id`.
    #[tracing::instrument(skip(self))]
    pub async fn get_inventory_for_item(&self, item_id: &str) -> AppResult<InventoryItem> {
        within(self.timeout, self.find_for_item(item_id)).await
    }

    /// Creates or updates stock for an item.
    ///
    /// - no inventory id, no item id: a new item and a new inventory record are created;
    /// - no inventory id, known item id: the item's record is created, or updated if one exists;
    /// - inventory id given: the record is updated, provided it is bound to the given item.
    ///
    /// Quantity is replaced, never accumulated.
    #[tracing::instrument(skip(self, request), fields(id = %request.id, item_id = %request.item.id))]
    pub async fn update_inventory_item(&self, request: InventoryItem) -> AppResult<InventoryItem> {
        within(self.timeout, self.reconcile(request)).await
    }

    /// Deletes an inventory record and, when cascading, its item.
    #[tracing::instrument(skip(self))]
    pub async fn delete_item(&self, id: &str) -> AppResult<()> {
        within(self.timeout, self.remove(id)).await
    }

    pub async fn ping(&self) -> AppResult<()> {
        within(self.timeout, async move { self.inventory.ping().await.map_err(AppError::from) })
            .await
    }

    async fn list(
        &self,
        count: i64,
        offset: i64,
        filter: &InventorySpecification,
    ) -> AppResult<Vec<InventoryItem>> {
        let records = self.inventory.get_all(count, offset, filter).await?;
        if records.is_empty() {
            return Err(AppError::not_found(
                "no items found matching the specification",
            ));
        }
        fill_item_details(Arc::clone(&self.items), records).await
    }

    async fn find_for_item(&self, item_id: &str) -> AppResult<InventoryItem> {
        let mut record = self
            .inventory
            .get_inventory_for_item(item_id)
            .await?
            .ok_or_else(|| AppError::not_found("no item found matching the specification"))?;

        match self.items.get_one(&record.item.id).await? {
            Some(item) => record.item = item,
            None => tracing::warn!(item_id = %record.item.id, "inventory references a missing item"),
        }
        Ok(record)
    }

    async fn reconcile(&self, mut request: InventoryItem) -> AppResult<InventoryItem> {
        if request.quantity < 0 {
            return Err(AppError::bad_request(
                "invalid request. Quantity can't be less than 0",
            ));
        }

        if request.id.is_empty() {
            if request.item.id.is_empty() {
                validate_item(&request.item)?;
                let stamp = now();
                request.item.id = new_id();
                request.item.created_at = Some(stamp);
                request.item.updated_at = Some(stamp);
                request.item = self.items.save(&request.item).await?;
                tracing::info!(item_id = %request.item.id, "created item for new stock");
            } else {
                request.item = self
                    .items
                    .get_one(&request.item.id)
                    .await?
                    .ok_or_else(|| AppError::not_found("no item with such ID exists"))?;
            }
        }

        let mut existing = self
            .inventory
            .get_inventory_for_item(&request.item.id)
            .await?;

        if request.id.is_empty() {
            let bound = match existing.take() {
                Some(found) => found,
                None => match self.insert(&mut request).await? {
                    None => return Ok(request),
                    Some(winner) => winner,
                },
            };
            request.id = bound.id.clone();
            existing = Some(bound);
        }

        let bound_id = existing.as_ref().map(|found| found.id.as_str());
        if bound_id != Some(request.id.as_str()) {
            tracing::error!(
                id = %request.id,
                item_id = %request.item.id,
                bound_id = ?bound_id,
                "rejected inventory update that would rebind the item"
            );
            return Err(AppError::bad_request(
                "invalid request. Can't change the item while updating",
            ));
        }

        request.updated_at = Some(now());
        let mut updated = self.inventory.edit(&request).await?;
        if let Some(item) = self.items.get_one(&updated.item.id).await? {
            updated.item = item;
        }
        Ok(updated)
    }

    /// Stores `request` as a new record. When a concurrent request stocked
    /// the same item first, the insert is refused and that record is returned.
    async fn insert(&self, request: &mut InventoryItem) -> AppResult<Option<InventoryItem>> {
        request.id = new_id();
        request.updated_at = Some(now());
        match self.inventory.save(request).await {
            Ok(_) => {
                tracing::info!(id = %request.id, item_id = %request.item.id, "created inventory record");
                Ok(None)
            }
            Err(e) if ConstraintViolation::find(&e).is_some() => {
                let winner = self
                    .inventory
                    .get_inventory_for_item(&request.item.id)
                    .await?
                    .ok_or_else(|| {
                        AppError::internal(format!(
                            "inventory for item {} vanished after a conflicting insert",
                            request.item.id
                        ))
                    })?;
                tracing::info!(id = %winner.id, item_id = %request.item.id, "item stocked concurrently, updating that record");
                Ok(Some(winner))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn remove(&self, id: &str) -> AppResult<()> {
        let record = self
            .inventory
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("no such item found"))?;

        self.inventory.delete(&record.id).await?;
        if self.cascade_item_delete {
            self.items.delete(&record.item.id).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::item::Item;
    use crate::domain::specification::ItemSpecification;
    use crate::storage::MemoryStore;
    use async_trait::async_trait;

    fn service() -> (Arc<MemoryStore>, InventoryService) {
        let store = Arc::new(MemoryStore::new());
        let service = InventoryService::new(store.clone(), store.clone(), Duration::from_secs(5));
        (store, service)
    }

    fn new_stock(name: &str, price: f64, quantity: i32) -> InventoryItem {
        InventoryItem {
            item: Item {
                name: name.into(),
                price,
                ..Item::default()
            },
            quantity,
            ..InventoryItem::default()
        }
    }

    fn restock(item_id: &str, quantity: i32) -> InventoryItem {
        InventoryItem {
            item: Item::reference(item_id),
            quantity,
            ..InventoryItem::default()
        }
    }

    #[tokio::test]
    async fn empty_ids_create_item_and_inventory() {
        let (store, service) = service();
        let created = service
            .update_inventory_item(new_stock("Widget", 9.99, 5))
            .await
            .unwrap();

        assert!(!created.id.is_empty());
        assert!(!created.item.id.is_empty());
        assert_eq!(created.quantity, 5);
        assert!(created.updated_at.is_some());

        let stored_item = ItemRepository::get_one(&*store, &created.item.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored_item, created.item);
        assert_eq!(store.inventory_count().unwrap(), 1);
    }

    #[tokio::test]
    async fn known_item_without_stock_gets_one_record() {
        let (store, service) = service();
        let item = Item {
            id: "item-1".into(),
            name: "Bolt".into(),
            price: 0.25,
            ..Item::default()
        };
        ItemRepository::save(&*store, &item).await.unwrap();

        let created = service.update_inventory_item(restock("item-1", 7)).await.unwrap();

        assert_eq!(created.item, item);
        assert_eq!(created.quantity, 7);
        assert_eq!(store.inventory_count().unwrap(), 1);
        assert_eq!(store.item_count().unwrap(), 1);
        let bound = InventoryRepository::get_inventory_for_item(&*store, "item-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(bound.id, created.id);
    }

    #[tokio::test]
    async fn restocking_replaces_quantity_and_keeps_the_id() {
        let (store, service) = service();
        let first = service
            .update_inventory_item(new_stock("Widget", 9.99, 5))
            .await
            .unwrap();

        let second = service
            .update_inventory_item(restock(&first.item.id, 3))
            .await
            .unwrap();

        assert_eq!(second.id, first.id);
        assert_eq!(second.quantity, 3);
        assert_eq!(second.item.name, "Widget");
        assert!(second.updated_at >= first.updated_at);
        assert_eq!(store.inventory_count().unwrap(), 1);
    }

    #[tokio::test]
    async fn explicit_inventory_id_updates_in_place() {
        let (_, service) = service();
        let first = service
            .update_inventory_item(new_stock("Widget", 9.99, 5))
            .await
            .unwrap();

        let updated = service
            .update_inventory_item(InventoryItem {
                id: first.id.clone(),
                item: Item::reference(first.item.id.clone()),
                quantity: 0,
                updated_at: None,
            })
            .await
            .unwrap();

        assert_eq!(updated.id, first.id);
        assert_eq!(updated.quantity, 0);
        assert_eq!(updated.item.name, "Widget");
    }

    #[tokio::test]
    async fn rebinding_to_another_item_is_rejected() {
        let (store, service) = service();
        let widget = service
            .update_inventory_item(new_stock("Widget", 9.99, 5))
            .await
            .unwrap();
        let gadget = service
            .update_inventory_item(new_stock("Gadget", 4.0, 2))
            .await
            .unwrap();

        let err = service
            .update_inventory_item(InventoryItem {
                id: widget.id.clone(),
                item: Item::reference(gadget.item.id.clone()),
                quantity: 99,
                updated_at: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(ref m) if m.contains("change the item")));

        let widget_now = InventoryRepository::get_by_id(&*store, &widget.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(widget_now.quantity, 5);
        assert_eq!(widget_now.item.id, widget.item.id);
        let gadget_now = InventoryRepository::get_by_id(&*store, &gadget.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(gadget_now.quantity, 2);
    }

    #[tokio::test]
    async fn inventory_id_for_unstocked_item_is_rejected() {
        let (store, service) = service();
        let item = Item {
            id: "item-1".into(),
            name: "Bolt".into(),
            ..Item::default()
        };
        ItemRepository::save(&*store, &item).await.unwrap();

        let err = service
            .update_inventory_item(InventoryItem {
                id: "made-up".into(),
                item: Item::reference("item-1"),
                quantity: 1,
                updated_at: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert_eq!(store.inventory_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn negative_quantity_fails_before_any_write() {
        let (store, service) = service();
        let err = service
            .update_inventory_item(new_stock("Widget", 9.99, -1))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(ref m) if m.contains("Quantity")));
        assert_eq!(store.item_count().unwrap(), 0);
        assert_eq!(store.inventory_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn unknown_item_id_is_not_found() {
        let (store, service) = service();
        let err = service
            .update_inventory_item(restock("ghost", 1))
            .await
            .unwrap_err();
        assert_eq!(err, AppError::not_found("no item with such ID exists"));
        assert_eq!(store.item_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn listing_hydrates_items_and_reports_empty_results() {
        let (_, service) = service();
        let missing = service
            .get_all(20, 0, &InventorySpecification::default())
            .await
            .unwrap_err();
        assert!(matches!(missing, AppError::NotFound(_)));

        service.update_inventory_item(new_stock("Widget", 9.99, 5)).await.unwrap();
        service.update_inventory_item(new_stock("Gadget", 4.0, 50)).await.unwrap();

        let all = service
            .get_all(20, 0, &InventorySpecification::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|r| !r.item.name.is_empty()));

        let bulk = InventorySpecification::new(10, None, ItemSpecification::default());
        let found = service.get_all(20, 0, &bulk).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].item.name, "Gadget");
    }

    #[tokio::test]
    async fn lookup_by_item_id() {
        let (_, service) = service();
        let created = service
            .update_inventory_item(new_stock("Widget", 9.99, 5))
            .await
            .unwrap();

        let found = service.get_inventory_for_item(&created.item.id).await.unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(found.item.name, "Widget");

        assert!(matches!(
            service.get_inventory_for_item("ghost").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn delete_cascades_to_the_item_by_default() {
        let (store, service) = service();
        let created = service
            .update_inventory_item(new_stock("Widget", 9.99, 5))
            .await
            .unwrap();

        service.delete_item(&created.id).await.unwrap();
        assert_eq!(store.inventory_count().unwrap(), 0);
        assert_eq!(store.item_count().unwrap(), 0);

        assert!(matches!(service.delete_item(&created.id).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn delete_can_keep_the_item() {
        let (store, service) = service();
        let service = service.with_cascade_item_delete(false);
        let created = service
            .update_inventory_item(new_stock("Widget", 9.99, 5))
            .await
            .unwrap();

        service.delete_item(&created.id).await.unwrap();
        assert_eq!(store.inventory_count().unwrap(), 0);
        assert_eq!(store.item_count().unwrap(), 1);
    }

    /// Inventory store whose list query never completes.
    struct StalledInventory;

    #[async_trait]
    impl InventoryRepository for StalledInventory {
        async fn get_inventory_for_item(&self, _: &str) -> anyhow::Result<Option<InventoryItem>> {
            Ok(None)
        }

        async fn get_all(
            &self,
            _: i64,
            _: i64,
            _: &InventorySpecification,
        ) -> anyhow::Result<Vec<InventoryItem>> {
            std::future::pending().await
        }

        async fn get_by_id(&self, _: &str) -> anyhow::Result<Option<InventoryItem>> {
            Ok(None)
        }

        async fn save(&self, inventory: &InventoryItem) -> anyhow::Result<InventoryItem> {
            Ok(inventory.clone())
        }

        async fn edit(&self, inventory: &InventoryItem) -> anyhow::Result<InventoryItem> {
            Ok(inventory.clone())
        }

        async fn delete(&self, _: &str) -> anyhow::Result<()> {
            Ok(())
        }

        async fn ping(&self) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn slow_storage_hits_the_deadline() {
        let service = InventoryService::new(
            Arc::new(MemoryStore::new()),
            Arc::new(StalledInventory),
            Duration::from_millis(50),
        );
        let err = service
            .get_all(20, 0, &InventorySpecification::default())
            .await
            .unwrap_err();
        assert_eq!(err, AppError::internal("request timed out"));
    }

    /// Delegates to a [`MemoryStore`], but answers "which record stocks this
    /// item" only after a delay, so concurrent requests all see the same answer.
    struct LaggingLookup(Arc<MemoryStore>);

    #[async_trait]
    impl InventoryRepository for LaggingLookup {
        async fn get_inventory_for_item(&self, item_id: &str) -> anyhow::Result<Option<InventoryItem>> {
            tokio::time::sleep(Duration::from_millis(50)).await;
            self.0.get_inventory_for_item(item_id).await
        }

        async fn get_all(
            &self,
            count: i64,
            offset: i64,
            filter: &InventorySpecification,
        ) -> anyhow::Result<Vec<InventoryItem>> {
            InventoryRepository::get_all(&*self.0, count, offset, filter).await
        }

        async fn get_by_id(&self, id: &str) -> anyhow::Result<Option<InventoryItem>> {
            self.0.get_by_id(id).await
        }

        async fn save(&self, inventory: &InventoryItem) -> anyhow::Result<InventoryItem> {
            InventoryRepository::save(&*self.0, inventory).await
        }

        async fn edit(&self, inventory: &InventoryItem) -> anyhow::Result<InventoryItem> {
            InventoryRepository::edit(&*self.0, inventory).await
        }

        async fn delete(&self, id: &str) -> anyhow::Result<()> {
            InventoryRepository::delete(&*self.0, id).await
        }

        async fn ping(&self) -> anyhow::Result<()> {
            self.0.ping().await
        }
    }

    #[tokio::test]
    async fn concurrent_first_stock_keeps_one_record_per_item() {
        let store = Arc::new(MemoryStore::new());
        let item = Item {
            id: "item-1".into(),
            name: "Bolt".into(),
            price: 0.25,
            ..Item::default()
        };
        ItemRepository::save(&*store, &item).await.unwrap();
        let service = InventoryService::new(
            store.clone(),
            Arc::new(LaggingLookup(store.clone())),
            Duration::from_secs(5),
        );

        let (a, b) = tokio::join!(
            service.update_inventory_item(restock("item-1", 1)),
            service.update_inventory_item(restock("item-1", 2)),
        );
        let (a, b) = (a.unwrap(), b.unwrap());

        assert_eq!(a.id, b.id);
        assert_eq!(a.item, item);
        assert_eq!(b.item, item);
        assert_eq!(store.inventory_count().unwrap(), 1);
        let bound = InventoryRepository::get_inventory_for_item(&*store, "item-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(bound.id, a.id);
        assert!(bound.quantity == 1 || bound.quantity == 2);
    }
}
