//! Domain Layer
//!
//! Contains all domain entities and core abstractions.
//! This layer performs no I/O.

mod entity;
mod event;
mod inventory;
mod leaderboard;
mod proof;
pub mod normalize;
pub mod seed;

pub use entity::{DomainError, DomainResult, RecordId};
pub use event::{CalendarEvent, NewEvent};
pub use inventory::{
    clamp_qty, InventoryItem, NewInventoryItem, UnitKind, COUNT_MAX_RANGE, DEFAULT_COUNT_MAX,
    PERCENT_MAX,
};
pub use leaderboard::{LeaderboardEntry, NewLeaderboardEntry};
pub use proof::{NewProof, ProofRecord};
