//! Default data inserted when the store starts out empty

use chrono::NaiveDate;

use super::event::NewEvent;
use super::inventory::{NewInventoryItem, UnitKind, DEFAULT_COUNT_MAX, PERCENT_MAX};
use super::leaderboard::NewLeaderboardEntry;

pub fn default_events(today: NaiveDate) -> Vec<NewEvent> {
    vec![NewEvent {
        date: today,
        title: "Husmote".to_string(),
        note: "Planlegg uka".to_string(),
    }]
}

pub fn default_inventory() -> Vec<NewInventoryItem> {
    vec![
        NewInventoryItem::seed("Kaffe", UnitKind::Count, 8, DEFAULT_COUNT_MAX),
        NewInventoryItem::seed("Toalettpapir", UnitKind::Count, 12, DEFAULT_COUNT_MAX),
        NewInventoryItem::seed("Vaskemiddel", UnitKind::Percent, 80, PERCENT_MAX),
        NewInventoryItem::seed("Oppvaskmiddel", UnitKind::Percent, 65, PERCENT_MAX),
    ]
}

pub fn default_members() -> Vec<NewLeaderboardEntry> {
    ["theodor_gay", "oscar_gay", "erlend"]
        .iter()
        .map(|name| NewLeaderboardEntry::new(name, 0))
        .collect()
}
