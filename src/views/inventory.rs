//! Inventory list rows

use super::Listing;
use crate::domain::{InventoryItem, RecordId};
use crate::store::AppState;

pub const EMPTY_INVENTORY: &str = "Ingen varer registrert.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryRow {
    pub id: RecordId,
    pub name: String,
    /// `Antall` or `Prosent`
    pub unit_label: &'static str,
    pub slider_min: i64,
    pub slider_max: i64,
    pub value: i64,
    /// `"x8"` or `"80%"`
    pub value_text: String,
    pub depleted: bool,
}

impl From<&InventoryItem> for InventoryRow {
    fn from(item: &InventoryItem) -> Self {
        Self {
            id: item.id,
            name: item.name.clone(),
            unit_label: item.unit.label(),
            slider_min: item.min,
            slider_max: item.max,
            value: item.qty,
            value_text: item.display_value(),
            depleted: item.is_depleted(),
        }
    }
}

/// Rows in store order (newest additions first)
pub fn inventory_list(state: &AppState) -> Listing<InventoryRow> {
    let rows = state.inventory.iter().map(InventoryRow::from).collect();
    Listing::from_rows(rows, EMPTY_INVENTORY)
}
