//! Proof log: the most recent submissions

use chrono::{DateTime, Utc};

use super::Listing;
use crate::domain::{ProofRecord, RecordId};
use crate::store::AppState;

/// Entries shown in the log
pub const PROOF_LOG_LIMIT: usize = 6;

pub const EMPTY_PROOFS: &str = "Ingen bevis lastet opp enda.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofEntry {
    pub id: RecordId,
    /// `"<user> +1 for <task>"`
    pub title: String,
    pub created_at: DateTime<Utc>,
    /// `"19.10.2026, 10:05:00"`
    pub time_text: String,
    pub photo_url: String,
    pub alt: String,
}

impl From<&ProofRecord> for ProofEntry {
    fn from(proof: &ProofRecord) -> Self {
        Self {
            id: proof.id,
            title: format!("{} +1 for {}", proof.user_name, proof.task),
            created_at: proof.created_at,
            time_text: proof.created_at.format("%d.%m.%Y, %H:%M:%S").to_string(),
            photo_url: proof.photo_url.clone(),
            alt: format!("Bevis for {}", proof.task),
        }
    }
}

/// Newest first, at most [`PROOF_LOG_LIMIT`] entries
pub fn proof_log(state: &AppState) -> Listing<ProofEntry> {
    let mut proofs: Vec<&ProofRecord> = state.proofs.iter().collect();
    proofs.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let rows = proofs
        .into_iter()
        .take(PROOF_LOG_LIMIT)
        .map(ProofEntry::from)
        .collect();
    Listing::from_rows(rows, EMPTY_PROOFS)
}
