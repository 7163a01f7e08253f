//! Calendar Event Entity
//!
//! A household event on a calendar day (no time of day).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use super::entity::{DomainError, DomainResult, RecordId};

/// An event on the shared calendar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// Unique identifier
    pub id: RecordId,
    /// Calendar day, stored as `YYYY-MM-DD`
    pub date: NaiveDate,
    pub title: String,
    /// Optional note, shown as tooltip
    #[serde(default)]
    pub note: Option<String>,
}

impl CalendarEvent {
    /// Note text when present and non-blank
    pub fn note_text(&self) -> Option<&str> {
        self.note.as_deref().filter(|n| !n.trim().is_empty())
    }
}

/// An event that has not been persisted yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEvent {
    pub date: NaiveDate,
    pub title: String,
    pub note: String,
}

impl NewEvent {
    /// Trim the text fields and reject an empty title
    pub fn new(date: NaiveDate, title: &str, note: &str) -> DomainResult<Self> {
        let title = title.trim();
        if title.is_empty() {
            return Err(DomainError::InvalidInput("event title is empty".to_string()));
        }
        Ok(Self {
            date,
            title: title.to_string(),
            note: note.trim().to_string(),
        })
    }
}
