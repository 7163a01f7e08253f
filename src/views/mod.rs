//! View Projections
//!
//! Pure functions from `AppState` to display models. Nothing here touches
//! the gateway or the clock; "today" is always passed in.

mod calendar;
mod inventory;
mod leaderboard;
mod proofs;
mod text;

pub use calendar::{
    calendar_view, event_list, month_label, month_start, today_label, CalendarView, DayCell, EventPill,
    EventRow, WEEKDAY_CODES,
};
pub use inventory::{inventory_list, InventoryRow};
pub use leaderboard::{leaderboard_list, LeaderRow};
pub use proofs::{proof_log, ProofEntry, PROOF_LOG_LIMIT};
pub use text::render_dashboard;

/// Either rows to show or the placeholder text for an empty list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing<T> {
    Empty(&'static str),
    Rows(Vec<T>),
}

impl<T> Listing<T> {
    pub(crate) fn from_rows(rows: Vec<T>, empty: &'static str) -> Self {
        if rows.is_empty() {
            Listing::Empty(empty)
        } else {
            Listing::Rows(rows)
        }
    }

    pub fn rows(&self) -> &[T] {
        match self {
            Listing::Empty(_) => &[],
            Listing::Rows(rows) => rows,
        }
    }
}
