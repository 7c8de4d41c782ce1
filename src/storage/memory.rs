//! In-process item and inventory store.
//!
//! Intended for local runs and tests. Rows are kept in id order so list
//! queries page deterministically, mirroring the `ORDER BY id` of the
//! Postgres repositories.

use crate::domain::error::ConstraintViolation;
use crate::domain::inventory::{InventoryItem, InventoryRepository};
use crate::domain::item::{Item, ItemRepository};
use crate::domain::specification::{InventorySpecification, ItemSpecification, Specification};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Default)]
struct Tables {
    items: BTreeMap<String, Item>,
    inventory: BTreeMap<String, InventoryItem>,
}

/// Backs both [`ItemRepository`] and [`InventoryRepository`] so that the
/// inventory filter can see item fields, the way the SQL join does.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

fn window<T>(rows: impl Iterator<Item = T>, count: i64, offset: i64) -> Vec<T> {
    let offset = usize::try_from(offset.max(0)).unwrap_or(usize::MAX);
    let count = usize::try_from(count.max(0)).unwrap_or(usize::MAX);
    rows.skip(offset).take(count).collect()
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>> {
        self.tables.read().map_err(|_| anyhow!("memory store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>> {
        self.tables.write().map_err(|_| anyhow!("memory store lock poisoned"))
    }

    pub fn item_count(&self) -> Result<usize> {
        Ok(self.read()?.items.len())
    }

    pub fn inventory_count(&self) -> Result<usize> {
        Ok(self.read()?.inventory.len())
    }
}

#[async_trait]
impl ItemRepository for MemoryStore {
    async fn get_all(
        &self,
        count: i64,
        offset: i64,
        filter: &ItemSpecification,
    ) -> Result<Vec<Item>> {
        let tables = self.read()?;
        let matching = tables
            .items
            .values()
            .filter(|item| filter.is_satisfied_by(item))
            .cloned();
        Ok(window(matching, count, offset))
    }

    async fn get_one(&self, id: &str) -> Result<Option<Item>> {
        Ok(self.read()?.items.get(id).cloned())
    }

    async fn save(&self, item: &Item) -> Result<Item> {
        let mut tables = self.write()?;
        if tables.items.contains_key(&item.id) {
            return Err(anyhow!("duplicate key value violates unique constraint item_pkey"));
        }
        tables.items.insert(item.id.clone(), item.clone());
        Ok(item.clone())
    }

    async fn edit(&self, item: &Item) -> Result<Item> {
        let mut tables = self.write()?;
        let stored = tables
            .items
            .get_mut(&item.id)
            .ok_or_else(|| anyhow!("item {} vanished during update", item.id))?;
        stored.name = item.name.clone();
        stored.description = item.description.clone();
        stored.price = item.price;
        stored.updated_at = item.updated_at;
        Ok(stored.clone())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut tables = self.write()?;
        if tables.inventory.values().any(|inv| inv.item.id == id) {
            return Err(ConstraintViolation::ItemStillStocked(id.to_string()).into());
        }
        tables.items.remove(id);
        Ok(())
    }
}

#[async_trait]
impl InventoryRepository for MemoryStore {
    async fn get_inventory_for_item(&self, item_id: &str) -> Result<Option<InventoryItem>> {
        let tables = self.read()?;
        Ok(tables
            .inventory
            .values()
            .find(|inv| inv.item.id == item_id)
            .cloned())
    }

    async fn get_all(
        &self,
        count: i64,
        offset: i64,
        filter: &InventorySpecification,
    ) -> Result<Vec<InventoryItem>> {
        let tables = self.read()?;
        let matching = tables.inventory.values().filter_map(|inv| {
            let item = tables.items.get(&inv.item.id)?;
            let joined = InventoryItem {
                item: item.clone(),
                ..inv.clone()
            };
            filter.is_satisfied_by(&joined).then(|| inv.clone())
        });
        Ok(window(matching, count, offset))
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<InventoryItem>> {
        Ok(self.read()?.inventory.get(id).cloned())
    }

    async fn save(&self, inventory: &InventoryItem) -> Result<InventoryItem> {
        let mut tables = self.write()?;
        if !tables.items.contains_key(&inventory.item.id) {
            return Err(anyhow!(
                "inventory references missing item {}",
                inventory.item.id
            ));
        }
        if tables.inventory.contains_key(&inventory.id) {
            return Err(anyhow!("duplicate key value violates unique constraint inventory_pkey"));
        }
        if tables
            .inventory
            .values()
            .any(|inv| inv.item.id == inventory.item.id)
        {
            return Err(ConstraintViolation::ItemAlreadyStocked(inventory.item.id.clone()).into());
        }
        let stored = InventoryItem {
            item: Item::reference(inventory.item.id.clone()),
            ..inventory.clone()
        };
        tables.inventory.insert(stored.id.clone(), stored);
        Ok(inventory.clone())
    }

    async fn edit(&self, inventory: &InventoryItem) -> Result<InventoryItem> {
        let mut tables = self.write()?;
        let stored = tables
            .inventory
            .get_mut(&inventory.id)
            .ok_or_else(|| anyhow!("inventory {} vanished during update", inventory.id))?;
        stored.quantity = inventory.quantity;
        stored.updated_at = inventory.updated_at;
        Ok(inventory.clone())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.write()?.inventory.remove(id);
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        self.read().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, name: &str, price: f64) -> Item {
        Item {
            id: id.into(),
            name: name.into(),
            price,
            ..Item::default()
        }
    }

    #[tokio::test]
    async fn items_page_in_id_order() {
        let store = MemoryStore::new();
        for id in ["c", "a", "b"] {
            ItemRepository::save(&store, &item(id, id, 1.0)).await.unwrap();
        }
        let page = ItemRepository::get_all(&store, 2, 1, &ItemSpecification::default())
            .await
            .unwrap();
        let ids: Vec<_> = page.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c"]);
    }

    #[tokio::test]
    async fn inventory_filter_sees_item_fields() {
        let store = MemoryStore::new();
        ItemRepository::save(&store, &item("i1", "Widget", 9.99)).await.unwrap();
        ItemRepository::save(&store, &item("i2", "Gadget", 3.0)).await.unwrap();
        for (id, item_id, quantity) in [("v1", "i1", 5), ("v2", "i2", 50)] {
            InventoryRepository::save(
                &store,
                &InventoryItem {
                    id: id.into(),
                    item: Item::reference(item_id),
                    quantity,
                    updated_at: None,
                },
            )
            .await
            .unwrap();
        }

        let widgets = InventorySpecification::new(0, None, ItemSpecification::new("widg", "", 0.0, None));
        let found = InventoryRepository::get_all(&store, 20, 0, &widgets).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "v1");
        // Only the reference is returned; hydration happens in the use case.
        assert_eq!(found[0].item, Item::reference("i1"));

        let bulk = InventorySpecification::new(10, None, ItemSpecification::default());
        let found = InventoryRepository::get_all(&store, 20, 0, &bulk).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "v2");
    }

    #[tokio::test]
    async fn referenced_items_cannot_be_deleted() {
        let store = MemoryStore::new();
        ItemRepository::save(&store, &item("i1", "Widget", 1.0)).await.unwrap();
        InventoryRepository::save(
            &store,
            &InventoryItem {
                id: "v1".into(),
                item: Item::reference("i1"),
                quantity: 1,
                updated_at: None,
            },
        )
        .await
        .unwrap();

        let err = ItemRepository::delete(&store, "i1").await.unwrap_err();
        assert_eq!(
            ConstraintViolation::find(&err),
            Some(&ConstraintViolation::ItemStillStocked("i1".into()))
        );
        InventoryRepository::delete(&store, "v1").await.unwrap();
        ItemRepository::delete(&store, "i1").await.unwrap();
        assert_eq!(store.item_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn an_item_is_stocked_by_at_most_one_record() {
        let store = MemoryStore::new();
        ItemRepository::save(&store, &item("i1", "Widget", 1.0)).await.unwrap();
        let stock = |id: &str| InventoryItem {
            id: id.into(),
            item: Item::reference("i1"),
            quantity: 1,
            updated_at: None,
        };
        InventoryRepository::save(&store, &stock("v1")).await.unwrap();

        let err = InventoryRepository::save(&store, &stock("v2")).await.unwrap_err();
        assert_eq!(
            ConstraintViolation::find(&err),
            Some(&ConstraintViolation::ItemAlreadyStocked("i1".into()))
        );
        assert_eq!(store.inventory_count().unwrap(), 1);
    }
}
