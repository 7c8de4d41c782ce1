//! Concurrent item-detail hydration for a page of inventory records.

use crate::domain::error::{AppError, AppResult};
use crate::domain::inventory::InventoryItem;
use crate::domain::item::{Item, ItemRepository};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::task::JoinSet;

/// Fills `item` on every record with the stored item details.
///
/// One fetch task is spawned per distinct item id. The first failing fetch
/// aborts the rest and the whole call fails; the task set is drained before
/// returning either way. Ids with no stored item keep a blank payload
/// (only `item.id` set). Record order and inventory ids are preserved.
///
/// Dropping the returned future aborts every outstanding fetch.
pub async fn fill_item_details(
    items: Arc<dyn ItemRepository>,
    mut records: Vec<InventoryItem>,
) -> AppResult<Vec<InventoryItem>> {
    let distinct: BTreeSet<String> = records.iter().map(|r| r.item.id.clone()).collect();

    let mut fetches = JoinSet::new();
    for item_id in distinct {
        let items = Arc::clone(&items);
        fetches.spawn(async move {
            let found = items.get_one(&item_id).await;
            (item_id, found)
        });
    }

    let mut fetched: HashMap<String, Item> = HashMap::with_capacity(fetches.len());
    let mut failure: Option<AppError> = None;
    while let Some(joined) = fetches.join_next().await {
        if failure.is_some() {
            // Draining aborted tasks.
            continue;
        }
        match joined {
            Ok((item_id, Ok(Some(item)))) => {
                fetched.insert(item_id, item);
            }
            Ok((item_id, Ok(None))) => {
                tracing::warn!(item_id = %item_id, "inventory references a missing item");
            }
            Ok((item_id, Err(e))) => {
                tracing::error!(item_id = %item_id, error = %e, "item fetch failed");
                failure = Some(AppError::from(e));
                fetches.abort_all();
            }
            Err(e) => {
                failure = Some(AppError::internal(format!("item fetch task failed: {}", e)));
                fetches.abort_all();
            }
        }
    }

    if let Some(err) = failure {
        return Err(err);
    }

    for record in records.iter_mut() {
        if let Some(item) = fetched.get(&record.item.id) {
            record.item = item.clone();
        }
    }
    Ok(records)
}
