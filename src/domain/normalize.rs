//! Record Normalization
//!
//! Backend rows are loosely typed. These functions turn them into valid
//! domain values without ever failing: unreadable fields fall back to
//! defaults, out-of-range quantities are clamped.
//!
//! Normalizing an already-normalized item yields the same item.

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::entity::RecordId;
use super::inventory::{clamp_qty, InventoryItem, UnitKind};
use super::leaderboard::LeaderboardEntry;

/// An inventory row as stored, every field optional and untyped
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawInventoryRecord {
    pub id: Option<Value>,
    pub name: Option<Value>,
    pub unit: Option<Value>,
    pub min: Option<Value>,
    pub max: Option<Value>,
    pub qty: Option<Value>,
}

impl RawInventoryRecord {
    /// Read the known columns out of a backend row. Non-objects read as empty.
    pub fn from_value(row: &Value) -> Self {
        Self {
            id: row.get("id").cloned(),
            name: row.get("name").cloned(),
            unit: row.get("type").cloned(),
            min: row.get("min").cloned(),
            max: row.get("max").cloned(),
            qty: row.get("qty").cloned(),
        }
    }

    /// Apply the defaulting rules. `None` only when the row has no identity.
    pub fn normalize(&self) -> Option<InventoryItem> {
        let id = read_id(self.id.as_ref())?;
        let unit = match self.unit.as_ref().and_then(Value::as_str) {
            Some(s) => UnitKind::from_str(s),
            None => UnitKind::Count,
        };
        let min = read_number(self.min.as_ref()).unwrap_or(0);
        let max = read_number(self.max.as_ref()).unwrap_or_else(|| unit.default_max());
        let qty = read_number(self.qty.as_ref()).unwrap_or_else(|| unit.default_fill(max));

        Some(InventoryItem {
            id,
            name: read_text(self.name.as_ref()),
            unit,
            min,
            max,
            qty: clamp_qty(qty, min, max),
        })
    }
}

impl From<&InventoryItem> for RawInventoryRecord {
    fn from(item: &InventoryItem) -> Self {
        Self {
            id: Some(Value::from(item.id.0)),
            name: Some(Value::from(item.name.clone())),
            unit: Some(Value::from(item.unit.as_str())),
            min: Some(Value::from(item.min)),
            max: Some(Value::from(item.max)),
            qty: Some(Value::from(item.qty)),
        }
    }
}

/// A leaderboard row as stored
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawLeaderboardRecord {
    pub id: Option<Value>,
    pub name: Option<Value>,
    pub score: Option<Value>,
}

impl RawLeaderboardRecord {
    pub fn from_value(row: &Value) -> Self {
        Self {
            id: row.get("id").cloned(),
            name: row.get("name").cloned(),
            score: row.get("score").cloned(),
        }
    }

    pub fn normalize(&self) -> Option<LeaderboardEntry> {
        Some(LeaderboardEntry {
            id: read_id(self.id.as_ref())?,
            name: read_text(self.name.as_ref()),
            score: read_number(self.score.as_ref()).unwrap_or(0),
        })
    }
}

/// Normalize every inventory row that has an identity
pub fn normalize_inventory(rows: &[Value]) -> Vec<InventoryItem> {
    rows.iter()
        .filter_map(|row| {
            let item = RawInventoryRecord::from_value(row).normalize();
            if item.is_none() {
                log::debug!("Dropping inventory row without id: {}", row);
            }
            item
        })
        .collect()
}

/// Normalize every leaderboard row that has an identity
pub fn normalize_leaderboard(rows: &[Value]) -> Vec<LeaderboardEntry> {
    rows.iter()
        .filter_map(|row| {
            let entry = RawLeaderboardRecord::from_value(row).normalize();
            if entry.is_none() {
                log::debug!("Dropping leaderboard row without id: {}", row);
            }
            entry
        })
        .collect()
}

/// Deserialize strictly typed rows (events, proofs), skipping malformed ones
pub fn parse_rows<T: DeserializeOwned>(kind: &str, rows: Vec<Value>) -> Vec<T> {
    rows.into_iter()
        .filter_map(|row| match serde_json::from_value::<T>(row) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                log::warn!("Skipping malformed {} row: {}", kind, e);
                None
            }
        })
        .collect()
}

/// JSON numbers only; fractions are rounded
fn read_number(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        _ => None,
    }
}

fn read_id(value: Option<&Value>) -> Option<RecordId> {
    match value? {
        Value::Number(n) => n.as_i64().map(RecordId),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn read_text(value: Option<&Value>) -> String {
    value
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_default()
}
