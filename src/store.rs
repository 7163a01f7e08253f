//! Application State Store
//!
//! In-memory cache of the backend. Owned by `App` behind a single async
//! mutex; every change goes through the methods below, which bump
//! `revision` so views know to re-project.

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::{CalendarEvent, InventoryItem, LeaderboardEntry, ProofRecord, RecordId};

/// Everything the views render
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AppState {
    /// Calendar month shown, relative to the current month
    pub month_offset: i32,
    pub events: Vec<CalendarEvent>,
    pub inventory: Vec<InventoryItem>,
    pub leaderboard: Vec<LeaderboardEntry>,
    pub proofs: Vec<ProofRecord>,
    /// Incremented on every change
    pub revision: u64,
}

/// Furthest the calendar may move from the current month, either way
pub const MAX_MONTH_OFFSET: i32 = 12 * 10_000;

/// Type alias for the shared store
pub type SharedState = Arc<Mutex<AppState>>;

pub fn shared(state: AppState) -> SharedState {
    Arc::new(Mutex::new(state))
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    fn touch(&mut self) {
        self.revision += 1;
    }

    // ========================
    // Inventory
    // ========================

    pub fn find_item(&self, id: RecordId) -> Option<&InventoryItem> {
        self.inventory.iter().find(|item| item.id == id)
    }

    pub fn set_inventory(&mut self, items: Vec<InventoryItem>) {
        self.inventory = items;
        self.touch();
    }

    /// Swap in a new value for the item with the same id
    pub fn replace_item(&mut self, updated: InventoryItem) -> bool {
        let Some(slot) = self.inventory.iter_mut().find(|item| item.id == updated.id) else {
            return false;
        };
        *slot = updated;
        self.touch();
        true
    }

    pub fn prepend_item(&mut self, item: InventoryItem) {
        self.inventory.insert(0, item);
        self.touch();
    }

    pub fn remove_item(&mut self, id: RecordId) -> Option<InventoryItem> {
        let pos = self.inventory.iter().position(|item| item.id == id)?;
        let removed = self.inventory.remove(pos);
        self.touch();
        Some(removed)
    }

    // ========================
    // Events
    // ========================

    pub fn set_events(&mut self, events: Vec<CalendarEvent>) {
        self.events = events;
        self.touch();
    }

    pub fn prepend_event(&mut self, event: CalendarEvent) {
        self.events.insert(0, event);
        self.touch();
    }

    pub fn remove_event(&mut self, id: RecordId) -> Option<CalendarEvent> {
        let pos = self.events.iter().position(|event| event.id == id)?;
        let removed = self.events.remove(pos);
        self.touch();
        Some(removed)
    }

    /// Move the calendar by `delta` months, returning the new offset.
    ///
    /// The offset stays within `MAX_MONTH_OFFSET` of the current month.
    pub fn shift_month(&mut self, delta: i32) -> i32 {
        self.month_offset = self
            .month_offset
            .saturating_add(delta)
            .clamp(-MAX_MONTH_OFFSET, MAX_MONTH_OFFSET);
        self.touch();
        self.month_offset
    }

    // ========================
    // Leaderboard
    // ========================

    pub fn find_member(&self, name: &str) -> Option<&LeaderboardEntry> {
        self.leaderboard.iter().find(|entry| entry.name == name)
    }

    pub fn set_leaderboard(&mut self, entries: Vec<LeaderboardEntry>) {
        self.leaderboard = entries;
        self.touch();
    }

    /// Replace the entry with the same name, or append it
    pub fn upsert_member(&mut self, entry: LeaderboardEntry) {
        match self.leaderboard.iter_mut().find(|e| e.name == entry.name) {
            Some(slot) => *slot = entry,
            None => self.leaderboard.push(entry),
        }
        self.touch();
    }

    /// Set the score of an existing member; unknown names are ignored
    pub fn set_member_score(&mut self, name: &str, score: i64) -> bool {
        let Some(slot) = self.leaderboard.iter_mut().find(|e| e.name == name) else {
            return false;
        };
        slot.score = score;
        self.touch();
        true
    }

    // ========================
    // Proofs
    // ========================

    pub fn set_proofs(&mut self, proofs: Vec<ProofRecord>) {
        self.proofs = proofs;
        self.touch();
    }

    pub fn prepend_proof(&mut self, proof: ProofRecord) {
        self.proofs.insert(0, proof);
        self.touch();
    }
}
