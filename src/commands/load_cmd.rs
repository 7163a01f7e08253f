//! Initial load and seeding

use chrono::NaiveDate;
use serde_json::Value;

use super::to_row;
use crate::app::App;
use crate::domain::{normalize, seed, CalendarEvent, DomainResult, ProofRecord};
use crate::repository::{EntityKind, Gateway};

/// What happened during `load_data`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Kinds whose list call failed (treated as empty)
    pub failed_reads: Vec<EntityKind>,
    /// Kinds that were empty and got default rows
    pub seeded: Vec<EntityKind>,
}

fn rows_or_empty(kind: EntityKind, result: DomainResult<Vec<Value>>, report: &mut LoadReport) -> Vec<Value> {
    match result {
        Ok(rows) => rows,
        Err(e) => {
            log::error!("Failed to load {}: {}", kind.table(), e);
            report.failed_reads.push(kind);
            Vec::new()
        }
    }
}

async fn seed_rows(gateway: &dyn Gateway, kind: EntityKind, rows: DomainResult<Vec<Value>>) -> Option<Vec<Value>> {
    let created = match rows {
        Ok(rows) => gateway.insert_many(kind, rows).await,
        Err(e) => Err(e),
    };
    match created {
        Ok(created) => {
            log::info!("Seeded {} with {} row(s)", kind.table(), created.len());
            Some(created)
        }
        Err(e) => {
            log::error!("Failed to seed {}: {}", kind.table(), e);
            None
        }
    }
}

/// Fetch every collection, then seed the empty ones.
///
/// Read and seed failures are logged and leave that collection empty;
/// loading itself never fails.
pub async fn load_data(app: &App, today: NaiveDate) -> LoadReport {
    let gateway = app.gateway.as_ref();
    let mut report = LoadReport::default();

    let (events, inventory, leaderboard, proofs) = tokio::join!(
        gateway.list(EntityKind::Events),
        gateway.list(EntityKind::Inventory),
        gateway.list(EntityKind::Leaderboard),
        gateway.list(EntityKind::Proofs),
    );

    let mut events: Vec<CalendarEvent> = normalize::parse_rows("events", rows_or_empty(EntityKind::Events, events, &mut report));
    let mut inventory = normalize::normalize_inventory(&rows_or_empty(EntityKind::Inventory, inventory, &mut report));
    let mut leaderboard =
        normalize::normalize_leaderboard(&rows_or_empty(EntityKind::Leaderboard, leaderboard, &mut report));
    let proofs: Vec<ProofRecord> = normalize::parse_rows("proofs", rows_or_empty(EntityKind::Proofs, proofs, &mut report));

    if events.is_empty() {
        let rows = seed::default_events(today).iter().map(to_row).collect();
        if let Some(created) = seed_rows(gateway, EntityKind::Events, rows).await {
            events = normalize::parse_rows("events", created);
            report.seeded.push(EntityKind::Events);
        }
    }
    if inventory.is_empty() {
        let rows = seed::default_inventory().iter().map(to_row).collect();
        if let Some(created) = seed_rows(gateway, EntityKind::Inventory, rows).await {
            inventory = normalize::normalize_inventory(&created);
            report.seeded.push(EntityKind::Inventory);
        }
    }
    if leaderboard.is_empty() {
        let rows = seed::default_members().iter().map(to_row).collect();
        if let Some(created) = seed_rows(gateway, EntityKind::Leaderboard, rows).await {
            leaderboard = normalize::normalize_leaderboard(&created);
            report.seeded.push(EntityKind::Leaderboard);
        }
    }

    let mut state = app.state.lock().await;
    state.set_events(events);
    state.set_inventory(inventory);
    state.set_leaderboard(leaderboard);
    state.set_proofs(proofs);
    log::info!(
        "Loaded {} event(s), {} item(s), {} member(s), {} proof(s)",
        state.events.len(),
        state.inventory.len(),
        state.leaderboard.len(),
        state.proofs.len()
    );
    report
}
