//! Inventory commands: quantity changes, additions, removals

use super::to_row;
use crate::app::App;
use crate::domain::normalize::RawInventoryRecord;
use crate::domain::{DomainError, DomainResult, InventoryItem, NewInventoryItem, RecordId, UnitKind};
use crate::repository::EntityKind;

/// Clamp `requested` into the item's bounds and store it.
///
/// Raises the depletion alert when a percent item lands on zero and
/// schedules a debounced save. Returns `None` for an unknown id.
pub async fn set_quantity(app: &App, id: RecordId, requested: i64) -> Option<InventoryItem> {
    let updated = {
        let mut state = app.state.lock().await;
        let next = state.find_item(id)?.with_qty(requested);
        state.replace_item(next.clone());
        next
    };

    app.scheduler.schedule(id);
    if updated.is_depleted() {
        app.alerts.show(updated.depletion_message());
    }
    Some(updated)
}

/// Create an item on the backend and prepend it locally.
///
/// Nothing changes locally if the backend refuses.
pub async fn add_item(app: &App, name: &str, unit: UnitKind, max_hint: Option<i64>) -> DomainResult<InventoryItem> {
    let draft = NewInventoryItem::new(name, unit, max_hint);
    if draft.name.is_empty() {
        return Err(DomainError::InvalidInput("item name is empty".to_string()));
    }

    let created = match app.gateway.insert(EntityKind::Inventory, to_row(&draft)?).await {
        Ok(row) => row,
        Err(e) => {
            log::error!("Failed to add item '{}': {}", draft.name, e);
            return Err(e);
        }
    };
    let item = RawInventoryRecord::from_value(&created)
        .normalize()
        .ok_or_else(|| DomainError::Backend(format!("created item has no id: {}", created)))?;

    log::info!("Added item {} '{}'", item.id, item.name);
    app.state.lock().await.prepend_item(item.clone());
    Ok(item)
}

/// Remove locally first, then on the backend. A backend failure is
/// returned but the local removal stands.
pub async fn remove_item(app: &App, id: RecordId) -> DomainResult<()> {
    let removed = app.state.lock().await.remove_item(id);
    if removed.is_none() {
        log::debug!("Item {} not in local state", id);
    }

    app.gateway.delete(EntityKind::Inventory, id).await.map_err(|e| {
        log::error!("Failed to delete item {}: {}", id, e);
        e
    })
}
