//! Domain model: entities, repository contracts, filter specifications and errors.

use chrono::{DateTime, SubsecRound, Utc};

pub mod error;
pub mod inventory;
pub mod item;
pub mod specification;

pub use error::{AppError, AppResult, ConstraintViolation};
pub use inventory::{InventoryItem, InventoryRepository};
pub use item::{Item, ItemRepository};
pub use specification::{InventorySpecification, ItemSpecification, Specification};

/// Current time at the precision Postgres stores (microseconds), so that a
/// stamped record round-trips through the database unchanged.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Fresh opaque identifier for a new item or inventory record.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
