//! Debounced Inventory Saves
//!
//! Slider drags produce a burst of quantity changes. `SaveScheduler` keeps
//! one pending timer per item: scheduling again cancels the previous timer
//! and starts a new one. When a timer survives the quiet period it clears
//! its table entry, reads the item's *current* quantity and writes it.
//!
//! Once a write has started it is never cancelled by a later `schedule`.

use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::domain::RecordId;
use crate::repository::{EntityKind, Gateway, RowKey};
use crate::store::SharedState;

/// Quiet period before a quantity change is written
pub const DEFAULT_SAVE_DELAY: Duration = Duration::from_millis(300);

struct Pending {
    generation: u64,
    handle: JoinHandle<()>,
}

struct Inner {
    state: SharedState,
    gateway: Arc<dyn Gateway>,
    delay: Duration,
    pending: Mutex<HashMap<RecordId, Pending>>,
    next_generation: AtomicU64,
}

impl Inner {
    fn pending(&self) -> MutexGuard<'_, HashMap<RecordId, Pending>> {
        // Entries stay consistent even if a holder panicked
        self.pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Remove the entry for `id` if it still belongs to `generation`
    fn take_if_current(&self, id: RecordId, generation: u64) -> bool {
        let mut pending = self.pending();
        match pending.get(&id) {
            Some(entry) if entry.generation == generation => {
                pending.remove(&id);
                true
            }
            _ => false,
        }
    }

    /// Write the item's quantity as it is right now
    async fn persist(&self, id: RecordId) {
        let qty = {
            let state = self.state.lock().await;
            state.find_item(id).map(|item| item.qty)
        };
        let Some(qty) = qty else {
            log::debug!("Item {} gone before save, skipping", id);
            return;
        };

        match self
            .gateway
            .update(EntityKind::Inventory, RowKey::Id(id), json!({ "qty": qty }))
            .await
        {
            Ok(Some(_)) => log::debug!("Saved item {} qty={}", id, qty),
            Ok(None) => log::warn!("Save for item {} matched no row", id),
            Err(e) => log::error!("Failed to save item {}: {}", id, e),
        }
    }
}

/// Per-item debounce table
#[derive(Clone)]
pub struct SaveScheduler {
    inner: Arc<Inner>,
}

impl SaveScheduler {
    pub fn new(state: SharedState, gateway: Arc<dyn Gateway>, delay: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                state,
                gateway,
                delay,
                pending: Mutex::new(HashMap::new()),
                next_generation: AtomicU64::new(0),
            }),
        }
    }

    /// (Re)start the quiet-period timer for `id`
    pub fn schedule(&self, id: RecordId) {
        let generation = self.inner.next_generation.fetch_add(1, Ordering::SeqCst);
        let inner = Arc::clone(&self.inner);

        // Hold the table while spawning so the task cannot look itself up
        // before it has been recorded.
        let mut pending = self.inner.pending();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(inner.delay).await;
            if inner.take_if_current(id, generation) {
                inner.persist(id).await;
            }
        });
        if let Some(previous) = pending.insert(id, Pending { generation, handle }) {
            previous.handle.abort();
        }
    }

    pub fn is_pending(&self, id: RecordId) -> bool {
        self.inner.pending().contains_key(&id)
    }

    pub fn pending_count(&self) -> usize {
        self.inner.pending().len()
    }

    /// Cancel every pending timer and write those items now.
    ///
    /// Returns how many items were written.
    pub async fn flush(&self) -> usize {
        let drained: Vec<RecordId> = {
            let mut pending = self.inner.pending();
            pending
                .drain()
                .map(|(id, entry)| {
                    entry.handle.abort();
                    id
                })
                .collect()
        };
        for id in &drained {
            self.inner.persist(*id).await;
        }
        drained.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{InventoryItem, UnitKind};
    use crate::repository::memory::{MemoryGateway, Op};
    use crate::store::{shared, AppState};

    fn setup() -> (SharedState, Arc<MemoryGateway>, SaveScheduler) {
        let mut state = AppState::new();
        state.set_inventory(vec![
            InventoryItem {
                id: RecordId(1),
                name: "Kaffe".into(),
                unit: UnitKind::Count,
                min: 0,
                max: 20,
                qty: 8,
            },
            InventoryItem {
                id: RecordId(2),
                name: "Vaskemiddel".into(),
                unit: UnitKind::Percent,
                min: 0,
                max: 100,
                qty: 80,
            },
        ]);
        let state = shared(state);
        let gateway = Arc::new(MemoryGateway::new());
        let scheduler = SaveScheduler::new(state.clone(), gateway.clone(), DEFAULT_SAVE_DELAY);
        (state, gateway, scheduler)
    }

    async fn set_qty(state: &SharedState, id: i64, qty: i64) {
        let mut state = state.lock().await;
        let next = state.find_item(RecordId(id)).unwrap().with_qty(qty);
        state.replace_item(next);
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_collapses_to_one_write_with_latest_value() {
        let (state, gateway, scheduler) = setup();

        for qty in [7, 6, 5, 4] {
            set_qty(&state, 1, qty).await;
            scheduler.schedule(RecordId(1));
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        assert!(gateway.updates(EntityKind::Inventory).is_empty());

        // Changed after the last schedule but before the timer fires
        set_qty(&state, 1, 3).await;
        tokio::time::sleep(Duration::from_millis(250)).await;

        let updates = gateway.updates(EntityKind::Inventory);
        assert_eq!(updates, vec![(RowKey::Id(RecordId(1)), json!({"qty": 3}))]);
        assert!(!scheduler.is_pending(RecordId(1)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_write_during_continuous_activity() {
        let (_state, gateway, scheduler) = setup();

        for _ in 0..20 {
            scheduler.schedule(RecordId(1));
            tokio::time::sleep(Duration::from_millis(299)).await;
        }
        assert!(gateway.updates(EntityKind::Inventory).is_empty());
        assert_eq!(scheduler.pending_count(), 1);

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(gateway.updates(EntityKind::Inventory).len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_items_are_debounced_independently() {
        let (_state, gateway, scheduler) = setup();

        scheduler.schedule(RecordId(1));
        scheduler.schedule(RecordId(2));
        assert_eq!(scheduler.pending_count(), 2);
        tokio::time::sleep(Duration::from_millis(400)).await;

        let mut keys: Vec<_> = gateway
            .updates(EntityKind::Inventory)
            .into_iter()
            .map(|(key, _)| key)
            .collect();
        keys.sort_by_key(|k| k.value_string());
        assert_eq!(keys, vec![RowKey::Id(RecordId(1)), RowKey::Id(RecordId(2))]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_removed_item_is_not_written() {
        let (state, gateway, scheduler) = setup();

        scheduler.schedule(RecordId(2));
        state.lock().await.remove_item(RecordId(2));
        tokio::time::sleep(Duration::from_millis(400)).await;

        assert!(gateway.updates(EntityKind::Inventory).is_empty());
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_write_clears_entry() {
        let (_state, gateway, scheduler) = setup();
        gateway.fail(Op::Update);

        scheduler.schedule(RecordId(1));
        tokio::time::sleep(Duration::from_millis(400)).await;

        assert_eq!(gateway.updates(EntityKind::Inventory).len(), 1);
        assert!(!scheduler.is_pending(RecordId(1)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_writes_immediately() {
        let (state, gateway, scheduler) = setup();

        set_qty(&state, 1, 11).await;
        scheduler.schedule(RecordId(1));
        assert_eq!(scheduler.flush().await, 1);
        assert_eq!(
            gateway.updates(EntityKind::Inventory),
            vec![(RowKey::Id(RecordId(1)), json!({"qty": 11}))]
        );

        // The cancelled timer must not write a second time
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(gateway.updates(EntityKind::Inventory).len(), 1);
    }
}
