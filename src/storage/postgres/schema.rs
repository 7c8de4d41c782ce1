//! Connection setup and idempotent table creation.

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

const CREATE_ITEM_TABLE: &str = "CREATE TABLE IF NOT EXISTS item (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    price DOUBLE PRECISION NOT NULL,
    created_at TIMESTAMPTZ,
    updated_at TIMESTAMPTZ
)";

const CREATE_INVENTORY_TABLE: &str = "CREATE TABLE IF NOT EXISTS inventory (
    id TEXT PRIMARY KEY,
    quantity INTEGER NOT NULL,
    updated_at TIMESTAMPTZ,
    item_id TEXT NOT NULL CONSTRAINT inventory_item_id_fkey REFERENCES item(id)
)";

/// Each item is stocked by at most one inventory record.
const CREATE_INVENTORY_ITEM_INDEX: &str =
    "CREATE UNIQUE INDEX IF NOT EXISTS inventory_item_id_key ON inventory (item_id)";

/// Name Postgres reports when a second record for the same item is inserted.
pub(crate) const INVENTORY_ITEM_UNIQUE: &str = "inventory_item_id_key";

/// Name Postgres reports when a stocked item is deleted.
pub(crate) const INVENTORY_ITEM_FK: &str = "inventory_item_id_fkey";

/// True when `err` was raised by the database constraint named `constraint`.
pub(crate) fn violates(err: &sqlx::Error, constraint: &str) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.constraint() == Some(constraint))
}

/// Opens a connection pool against `database_url`.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
        .context("failed to connect to DATABASE_URL")
}

/// Creates the `item` and `inventory` tables if they are missing.
///
/// Runs as a single transaction: either every statement applies or none does.
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    tracing::info!("ensuring item and inventory tables exist");
    let mut tx = pool.begin().await?;
    for statement in [CREATE_ITEM_TABLE, CREATE_INVENTORY_TABLE, CREATE_INVENTORY_ITEM_INDEX] {
        sqlx::query(statement)
            .execute(tx.as_mut())
            .await
            .with_context(|| format!("schema statement failed: {}", statement))?;
    }
    tx.commit().await?;
    Ok(())
}
