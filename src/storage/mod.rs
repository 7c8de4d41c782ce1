//! Repository implementations: PostgreSQL for production, in-memory for local runs and tests.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::{PgInventoryRepository, PgItemRepository};
