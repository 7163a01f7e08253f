//! Calendar month grid and event list

use chrono::{Datelike, Duration, NaiveDate};

use super::Listing;
use crate::domain::{CalendarEvent, RecordId};
use crate::store::{AppState, MAX_MONTH_OFFSET};

/// Cells in the grid: six Monday-first weeks
pub const GRID_CELLS: usize = 42;

/// Two-letter weekday codes, Monday first
pub const WEEKDAY_CODES: [&str; 7] = ["MA", "TI", "ON", "TO", "FR", "LØ", "SØ"];

const WEEKDAY_SHORT: [&str; 7] = ["man.", "tir.", "ons.", "tor.", "fre.", "lør.", "søn."];

const MONTH_NAMES: [&str; 12] = [
    "januar", "februar", "mars", "april", "mai", "juni", "juli", "august", "september", "oktober",
    "november", "desember",
];

const MONTH_SHORT: [&str; 12] = [
    "jan.", "feb.", "mar.", "apr.", "mai", "jun.", "jul.", "aug.", "sep.", "okt.", "nov.", "des.",
];

pub const EMPTY_EVENTS: &str = "Ingen planlagte ting.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventPill {
    pub id: RecordId,
    pub title: String,
    /// Note if present, otherwise the title
    pub tooltip: String,
    /// Every other pill on a day uses the secondary style
    pub secondary: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayCell {
    pub date: NaiveDate,
    pub day: u32,
    pub weekday: &'static str,
    /// Belongs to the previous or next month
    pub outside: bool,
    pub today: bool,
    pub events: Vec<EventPill>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarView {
    pub label: String,
    pub month_offset: i32,
    pub cells: Vec<DayCell>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRow {
    pub id: RecordId,
    pub title: String,
    /// `"<date>"` or `"<date> - <note>"`
    pub meta: String,
}

/// First day of the month `offset` months away from `today`'s month.
///
/// `offset` is clamped to `MAX_MONTH_OFFSET` either way.
pub fn month_start(today: NaiveDate, offset: i32) -> NaiveDate {
    let offset = offset.clamp(-MAX_MONTH_OFFSET, MAX_MONTH_OFFSET);
    let months = i64::from(today.year()) * 12 + i64::from(today.month0()) + i64::from(offset);
    let month = months.rem_euclid(12) as u32 + 1;
    i32::try_from(months.div_euclid(12))
        .ok()
        .and_then(|year| NaiveDate::from_ymd_opt(year, month, 1))
        .or_else(|| today.with_day(1))
        .unwrap_or(today)
}

/// `"oktober 2026"`
pub fn month_label(first: NaiveDate) -> String {
    format!("{} {}", MONTH_NAMES[first.month0() as usize], first.year())
}

/// `"I dag: man. 19. okt."`
pub fn today_label(today: NaiveDate) -> String {
    format!(
        "I dag: {} {:02}. {}",
        WEEKDAY_SHORT[today.weekday().num_days_from_monday() as usize],
        today.day(),
        MONTH_SHORT[today.month0() as usize]
    )
}

fn pills_for(events: &[CalendarEvent], date: NaiveDate) -> Vec<EventPill> {
    events
        .iter()
        .filter(|event| event.date == date)
        .enumerate()
        .map(|(index, event)| EventPill {
            id: event.id,
            title: event.title.clone(),
            tooltip: event.note_text().unwrap_or(&event.title).to_string(),
            secondary: index % 2 == 1,
        })
        .collect()
}

pub fn calendar_view(state: &AppState, today: NaiveDate) -> CalendarView {
    let first = month_start(today, state.month_offset);
    let lead = first.weekday().num_days_from_monday() as i64;
    let grid_start = first.checked_sub_signed(Duration::days(lead)).unwrap_or(first);

    let cells = (0..GRID_CELLS as i64)
        .map_while(|i| grid_start.checked_add_signed(Duration::days(i)))
        .map(|date| {
            DayCell {
                date,
                day: date.day(),
                weekday: WEEKDAY_CODES[date.weekday().num_days_from_monday() as usize],
                outside: date.month() != first.month(),
                today: state.month_offset == 0 && date == today,
                events: pills_for(&state.events, date),
            }
        })
        .collect();

    CalendarView {
        label: month_label(first),
        month_offset: state.month_offset,
        cells,
    }
}

/// All events by date; same-day events keep their stored order
pub fn event_list(state: &AppState) -> Listing<EventRow> {
    let mut events: Vec<&CalendarEvent> = state.events.iter().collect();
    events.sort_by_key(|event| event.date);

    let rows = events
        .into_iter()
        .map(|event| EventRow {
            id: event.id,
            title: event.title.clone(),
            meta: match event.note_text() {
                Some(note) => format!("{} - {}", event.date, note),
                None => event.date.to_string(),
            },
        })
        .collect();
    Listing::from_rows(rows, EMPTY_EVENTS)
}
