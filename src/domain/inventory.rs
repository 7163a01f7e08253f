//! Inventory Entity
//!
//! A consumable tracked with a slider: either a whole count with a
//! configurable ceiling, or a 0-100 percentage.

use serde::{Deserialize, Serialize};
use super::entity::RecordId;

/// Ceiling used for count items when none is given
pub const DEFAULT_COUNT_MAX: i64 = 20;
/// Bounds a user may choose for a count item's ceiling
pub const COUNT_MAX_RANGE: (i64, i64) = (1, 50);
/// Percent items always span 0..=100
pub const PERCENT_MAX: i64 = 100;

/// Unit kind determines the slider range and how quantities are shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    /// Whole items, e.g. coffee bags
    #[default]
    Count,
    /// Fill level, e.g. detergent bottle
    Percent,
}

impl UnitKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitKind::Count => "count",
            UnitKind::Percent => "percent",
        }
    }

    /// Anything other than `"percent"` is a count
    pub fn from_str(s: &str) -> Self {
        match s {
            "percent" => UnitKind::Percent,
            _ => UnitKind::Count,
        }
    }

    /// Ceiling used when a record carries none
    pub fn default_max(&self) -> i64 {
        match self {
            UnitKind::Count => DEFAULT_COUNT_MAX,
            UnitKind::Percent => PERCENT_MAX,
        }
    }

    /// Quantity a fresh or unreadable record starts at.
    ///
    /// Percent items fill to 100, count items fill to their own ceiling.
    pub fn default_fill(&self, max: i64) -> i64 {
        match self {
            UnitKind::Count => max,
            UnitKind::Percent => PERCENT_MAX,
        }
    }

    /// Label shown next to the item name
    pub fn label(&self) -> &'static str {
        match self {
            UnitKind::Count => "Antall",
            UnitKind::Percent => "Prosent",
        }
    }
}

/// Clamp `value` into `[min, max]`.
///
/// The upper bound is applied first, so a record with `min > max` settles
/// on `min`.
pub fn clamp_qty(value: i64, min: i64, max: i64) -> i64 {
    value.min(max).max(min)
}

/// An inventory item. Invariant: `min <= qty <= max` (or `qty == min` for a
/// record whose bounds are inverted).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    /// Unique identifier
    pub id: RecordId,
    /// Display name
    pub name: String,
    /// Unit kind, stored as `type` by the backend
    #[serde(rename = "type")]
    pub unit: UnitKind,
    pub min: i64,
    pub max: i64,
    /// Current quantity
    pub qty: i64,
}

impl InventoryItem {
    /// Copy of this item with `requested` clamped into its bounds
    pub fn with_qty(&self, requested: i64) -> Self {
        Self {
            qty: clamp_qty(requested, self.min, self.max),
            ..self.clone()
        }
    }

    /// A percent item at exactly zero
    pub fn is_depleted(&self) -> bool {
        self.unit == UnitKind::Percent && self.qty == 0
    }

    /// `"80%"` for percent items, `"x8"` for counts
    pub fn display_value(&self) -> String {
        match self.unit {
            UnitKind::Percent => format!("{}%", self.qty),
            UnitKind::Count => format!("x{}", self.qty),
        }
    }

    /// Message raised when the item runs out
    pub fn depletion_message(&self) -> String {
        format!("{} er tom (0%).", self.name)
    }
}

/// An item that has not been persisted yet (no identity)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewInventoryItem {
    pub name: String,
    #[serde(rename = "type")]
    pub unit: UnitKind,
    pub min: i64,
    pub max: i64,
    pub qty: i64,
}

impl NewInventoryItem {
    /// Build a fresh item from form input.
    ///
    /// Percent items are fixed at 100. Count items take `max_hint` clamped to
    /// 1..=50, or 20 when the hint is missing or zero.
    pub fn new(name: &str, unit: UnitKind, max_hint: Option<i64>) -> Self {
        let max = match unit {
            UnitKind::Percent => PERCENT_MAX,
            UnitKind::Count => {
                let hint = max_hint.filter(|v| *v != 0).unwrap_or(DEFAULT_COUNT_MAX);
                hint.clamp(COUNT_MAX_RANGE.0, COUNT_MAX_RANGE.1)
            }
        };
        Self {
            name: name.trim().to_string(),
            unit,
            min: 0,
            max,
            qty: unit.default_fill(max),
        }
    }

    pub fn seed(name: &str, unit: UnitKind, qty: i64, max: i64) -> Self {
        Self {
            name: name.to_string(),
            unit,
            min: 0,
            max,
            qty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(unit: UnitKind, min: i64, max: i64, qty: i64) -> InventoryItem {
        InventoryItem {
            id: RecordId(1),
            name: "Vaskemiddel".to_string(),
            unit,
            min,
            max,
            qty,
        }
    }

    #[test]
    fn test_with_qty_clamps_both_ends() {
        let base = item(UnitKind::Count, 0, 20, 5);
        assert_eq!(base.with_qty(-4).qty, 0);
        assert_eq!(base.with_qty(99).qty, 20);
        assert_eq!(base.with_qty(7).qty, 7);
        // Original is untouched
        assert_eq!(base.qty, 5);
    }

    #[test]
    fn test_inverted_bounds_settle_on_min() {
        assert_eq!(clamp_qty(10, 5, 3), 5);
    }

    #[test]
    fn test_depletion_only_for_percent_at_zero() {
        assert!(item(UnitKind::Percent, 0, 100, 0).is_depleted());
        assert!(!item(UnitKind::Percent, 0, 100, 1).is_depleted());
        assert!(!item(UnitKind::Count, 0, 20, 0).is_depleted());
        assert_eq!(
            item(UnitKind::Percent, 0, 100, 0).depletion_message(),
            "Vaskemiddel er tom (0%)."
        );
    }

    #[test]
    fn test_display_value() {
        assert_eq!(item(UnitKind::Percent, 0, 100, 80).display_value(), "80%");
        assert_eq!(item(UnitKind::Count, 0, 20, 8).display_value(), "x8");
    }

    #[test]
    fn test_new_item_max_rules() {
        let percent = NewInventoryItem::new("Såpe", UnitKind::Percent, Some(7));
        assert_eq!((percent.max, percent.qty), (100, 100));

        let count = NewInventoryItem::new("  Egg ", UnitKind::Count, Some(12));
        assert_eq!(count.name, "Egg");
        assert_eq!((count.max, count.qty), (12, 12));

        assert_eq!(NewInventoryItem::new("A", UnitKind::Count, None).max, 20);
        assert_eq!(NewInventoryItem::new("A", UnitKind::Count, Some(0)).max, 20);
        assert_eq!(NewInventoryItem::new("A", UnitKind::Count, Some(500)).max, 50);
        assert_eq!(NewInventoryItem::new("A", UnitKind::Count, Some(-3)).max, 1);
    }

    #[test]
    fn test_unit_kind_serialization() {
        assert_eq!(UnitKind::Percent.as_str(), "percent");
        assert_eq!(UnitKind::from_str("percent"), UnitKind::Percent);
        assert_eq!(UnitKind::from_str("liters"), UnitKind::Count);
        let json = serde_json::to_value(NewInventoryItem::new("A", UnitKind::Percent, None)).unwrap();
        assert_eq!(json["type"], "percent");
    }
}
