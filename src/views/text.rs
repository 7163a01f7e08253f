//! Plain-text dashboard used by the CLI

use chrono::NaiveDate;
use std::fmt::Write;

use super::{calendar_view, event_list, inventory_list, leaderboard_list, proof_log, today_label, Listing};
use crate::alert::Alert;
use crate::store::AppState;

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n== {} ==", title);
}

fn empty_or<T>(out: &mut String, listing: &Listing<T>) -> bool {
    if let Listing::Empty(message) = listing {
        let _ = writeln!(out, "  {}", message);
        return true;
    }
    false
}

/// Render every view as text
pub fn render_dashboard(state: &AppState, today: NaiveDate, alert: Option<&Alert>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", today_label(today));
    if let Some(alert) = alert {
        let _ = writeln!(out, "! {}", alert.message);
    }

    let calendar = calendar_view(state, today);
    section(&mut out, &calendar.label);
    for week in calendar.cells.chunks(7) {
        let line: Vec<String> = week
            .iter()
            .map(|cell| {
                let marker = if cell.today {
                    '*'
                } else if !cell.events.is_empty() {
                    '+'
                } else {
                    ' '
                };
                if cell.outside {
                    format!("  .{}", marker)
                } else {
                    format!(" {:>2}{}", cell.day, marker)
                }
            })
            .collect();
        let _ = writeln!(out, "{}", line.concat());
    }

    section(&mut out, "Hendelser");
    let events = event_list(state);
    if !empty_or(&mut out, &events) {
        for row in events.rows() {
            let _ = writeln!(out, "  [{}] {} ({})", row.id, row.title, row.meta);
        }
    }

    section(&mut out, "Varer");
    let inventory = inventory_list(state);
    if !empty_or(&mut out, &inventory) {
        for row in inventory.rows() {
            let _ = writeln!(
                out,
                "  [{}] {:<16} {:>5}  {} {}..{}",
                row.id, row.name, row.value_text, row.unit_label, row.slider_min, row.slider_max
            );
        }
    }

    section(&mut out, "Poengtavle");
    for row in leaderboard_list(state) {
        let _ = writeln!(out, "  {} {:<14} {:>3}  {}", row.initials, row.name, row.score, row.rank_label);
    }

    section(&mut out, "Bevis");
    let proofs = proof_log(state);
    if !empty_or(&mut out, &proofs) {
        for entry in proofs.rows() {
            let _ = writeln!(out, "  {}  {}  {}", entry.time_text, entry.title, entry.photo_url);
        }
    }
    out
}
