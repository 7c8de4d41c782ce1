//! PostgreSQL-backed repositories.

pub mod inventory;
pub mod item;
pub mod schema;

pub use inventory::PgInventoryRepository;
pub use item::PgItemRepository;
pub use schema::{connect, ensure_schema};
