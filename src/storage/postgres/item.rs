//! `item` table access.

use crate::domain::error::ConstraintViolation;
use crate::domain::item::{Item, ItemRepository};
use crate::domain::specification::{ItemSpecification, Specification};
use crate::storage::postgres::schema::{violates, INVENTORY_ITEM_FK};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};

const ITEM_COLUMNS: &str = "id, name, description, price, created_at, updated_at";

#[derive(Clone)]
pub struct PgItemRepository {
    pool: PgPool,
}

impl PgItemRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn item_from_row(row: &PgRow) -> Result<Item> {
    Ok(Item {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        price: row.try_get("price")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl ItemRepository for PgItemRepository {
    async fn get_all(
        &self,
        count: i64,
        offset: i64,
        filter: &ItemSpecification,
    ) -> Result<Vec<Item>> {
        let mut query =
            QueryBuilder::<Postgres>::new(format!("SELECT {} FROM item WHERE ", ITEM_COLUMNS));
        filter.push_predicate(&mut query);
        query.push(" ORDER BY item.id LIMIT ");
        query.push_bind(count);
        query.push(" OFFSET ");
        query.push_bind(offset);

        let rows = query.build().fetch_all(&self.pool).await?;
        rows.iter().map(item_from_row).collect()
    }

    async fn get_one(&self, id: &str) -> Result<Option<Item>> {
        let row = sqlx::query(&format!("SELECT {} FROM item WHERE id = $1", ITEM_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(item_from_row).transpose()
    }

    async fn save(&self, item: &Item) -> Result<Item> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "INSERT INTO item (id, name, description, price, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(&item.id)
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.price)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(tx.as_mut())
        .await?;
        tx.commit().await?;
        Ok(item.clone())
    }

    async fn edit(&self, item: &Item) -> Result<Item> {
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query(&format!(
            "UPDATE item SET name = $2, description = $3, price = $4, updated_at = $5
             WHERE id = $1 RETURNING {}",
            ITEM_COLUMNS
        ))
        .bind(&item.id)
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.price)
        .bind(item.updated_at)
        .fetch_optional(tx.as_mut())
        .await?
        .with_context(|| format!("item {} vanished during update", item.id))?;
        tx.commit().await?;
        item_from_row(&row)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM item WHERE id = $1")
            .bind(id)
            .execute(tx.as_mut())
            .await
            .map_err(|e| {
                if violates(&e, INVENTORY_ITEM_FK) {
                    anyhow::Error::new(ConstraintViolation::ItemStillStocked(id.to_string()))
                } else {
                    anyhow::Error::new(e)
                }
            })?;
        tx.commit().await?;
        Ok(())
    }
}
