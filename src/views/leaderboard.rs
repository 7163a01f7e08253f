//! Leaderboard ranking

use crate::domain::LeaderboardEntry;
use crate::store::AppState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderRow {
    /// 1-based
    pub rank: usize,
    /// `"#1 i kollektivet"`
    pub rank_label: String,
    pub name: String,
    pub initials: String,
    pub score: i64,
}

/// Highest score first; ties keep store order
pub fn leaderboard_list(state: &AppState) -> Vec<LeaderRow> {
    let mut entries: Vec<&LeaderboardEntry> = state.leaderboard.iter().collect();
    entries.sort_by(|a, b| b.score.cmp(&a.score));

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| LeaderRow {
            rank: index + 1,
            rank_label: format!("#{} i kollektivet", index + 1),
            name: entry.name.clone(),
            initials: entry.initials(),
            score: entry.score,
        })
        .collect()
}
