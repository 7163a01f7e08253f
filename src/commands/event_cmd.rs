//! Calendar commands

use chrono::NaiveDate;

use super::to_row;
use crate::app::App;
use crate::domain::{CalendarEvent, DomainResult, NewEvent, RecordId};
use crate::repository::EntityKind;

/// Create an event and prepend it on success
pub async fn add_event(app: &App, date: NaiveDate, title: &str, note: &str) -> DomainResult<CalendarEvent> {
    let draft = NewEvent::new(date, title, note)?;

    let created = match app.gateway.insert(EntityKind::Events, to_row(&draft)?).await {
        Ok(row) => row,
        Err(e) => {
            log::error!("Failed to add event '{}': {}", draft.title, e);
            return Err(e);
        }
    };
    let event: CalendarEvent = serde_json::from_value(created)?;

    log::info!("Added event {} on {}", event.id, event.date);
    app.state.lock().await.prepend_event(event.clone());
    Ok(event)
}

/// Remove locally, then on the backend (not rolled back on failure)
pub async fn remove_event(app: &App, id: RecordId) -> DomainResult<()> {
    app.state.lock().await.remove_event(id);

    app.gateway.delete(EntityKind::Events, id).await.map_err(|e| {
        log::error!("Failed to delete event {}: {}", id, e);
        e
    })
}

/// Move the calendar by `delta` months
pub async fn shift_month(app: &App, delta: i32) -> i32 {
    app.state.lock().await.shift_month(delta)
}
