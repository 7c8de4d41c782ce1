//! `inventory` table access.

use crate::domain::error::ConstraintViolation;
use crate::domain::inventory::{InventoryItem, InventoryRepository};
use crate::domain::item::Item;
use crate::domain::specification::{InventorySpecification, Specification};
use crate::storage::postgres::schema::{violates, INVENTORY_ITEM_UNIQUE};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};

const INVENTORY_COLUMNS: &str =
    "inventory.id, inventory.quantity, inventory.updated_at, inventory.item_id";

#[derive(Clone)]
pub struct PgInventoryRepository {
    pool: PgPool,
}

impl PgInventoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn inventory_from_row(row: &PgRow) -> Result<InventoryItem> {
    let item_id: String = row.try_get("item_id")?;
    Ok(InventoryItem {
        id: row.try_get("id")?,
        item: Item::reference(item_id),
        quantity: row.try_get("quantity")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl InventoryRepository for PgInventoryRepository {
    async fn get_inventory_for_item(&self, item_id: &str) -> Result<Option<InventoryItem>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM inventory WHERE inventory.item_id = $1 ORDER BY inventory.id LIMIT 1",
            INVENTORY_COLUMNS
        ))
        .bind(item_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(inventory_from_row).transpose()
    }

    async fn get_all(
        &self,
        count: i64,
        offset: i64,
        filter: &InventorySpecification,
    ) -> Result<Vec<InventoryItem>> {
        let mut query = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM inventory JOIN item ON item.id = inventory.item_id WHERE ",
            INVENTORY_COLUMNS
        ));
        filter.push_predicate(&mut query);
        query.push(" ORDER BY inventory.id LIMIT ");
        query.push_bind(count);
        query.push(" OFFSET ");
        query.push_bind(offset);

        let rows = query.build().fetch_all(&self.pool).await?;
        rows.iter().map(inventory_from_row).collect()
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<InventoryItem>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM inventory WHERE inventory.id = $1",
            INVENTORY_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(inventory_from_row).transpose()
    }

    async fn save(&self, inventory: &InventoryItem) -> Result<InventoryItem> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "INSERT INTO inventory (id, quantity, updated_at, item_id) VALUES ($1, $2, $3, $4)",
        )
        .bind(&inventory.id)
        .bind(inventory.quantity)
        .bind(inventory.updated_at)
        .bind(&inventory.item.id)
        .execute(tx.as_mut())
        .await
        .map_err(|e| {
            if violates(&e, INVENTORY_ITEM_UNIQUE) {
                anyhow::Error::new(ConstraintViolation::ItemAlreadyStocked(
                    inventory.item.id.clone(),
                ))
            } else {
                anyhow::Error::new(e)
            }
        })?;
        tx.commit().await?;
        Ok(inventory.clone())
    }

    async fn edit(&self, inventory: &InventoryItem) -> Result<InventoryItem> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query("UPDATE inventory SET quantity = $2, updated_at = $3 WHERE id = $1")
            .bind(&inventory.id)
            .bind(inventory.quantity)
            .bind(inventory.updated_at)
            .execute(tx.as_mut())
            .await?;
        if result.rows_affected() == 0 {
            return Err(anyhow::anyhow!("inventory {} vanished during update", inventory.id));
        }
        tx.commit().await?;
        Ok(inventory.clone())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM inventory WHERE id = $1")
            .bind(id)
            .execute(tx.as_mut())
            .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .context("DB ping failed")?;
        Ok(())
    }
}
