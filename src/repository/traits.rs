//! Repository Layer - Core Traits
//!
//! Defines the abstract interface to the backend: relational tables plus
//! object storage. Implementations talk to a hosted PostgREST backend or a
//! local SQLite file.
//!
//! Rows travel as untyped JSON; turning them into domain values is the
//! caller's job (see `domain::normalize`).

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{DomainResult, RecordId};

/// The four tables the application reads and writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Events,
    Inventory,
    Leaderboard,
    Proofs,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Events,
        EntityKind::Inventory,
        EntityKind::Leaderboard,
        EntityKind::Proofs,
    ];

    /// Backend table name
    pub fn table(&self) -> &'static str {
        match self {
            EntityKind::Events => "events",
            EntityKind::Inventory => "inventory",
            EntityKind::Leaderboard => "leaderboard",
            EntityKind::Proofs => "proofs",
        }
    }
}

/// Which row(s) an update targets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowKey {
    Id(RecordId),
    /// Leaderboard rows are addressed by member name
    Name(String),
}

impl RowKey {
    pub fn column(&self) -> &'static str {
        match self {
            RowKey::Id(_) => "id",
            RowKey::Name(_) => "name",
        }
    }

    pub fn value_string(&self) -> String {
        match self {
            RowKey::Id(id) => id.to_string(),
            RowKey::Name(name) => name.clone(),
        }
    }
}

/// Backend gateway. Every call may fail.
///
/// No ordering is promised between concurrent calls.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// All rows of a table
    async fn list(&self, kind: EntityKind) -> DomainResult<Vec<Value>>;

    /// Insert one row, returning it with its assigned identity
    async fn insert(&self, kind: EntityKind, row: Value) -> DomainResult<Value>;

    /// Insert several rows, returning them as created
    async fn insert_many(&self, kind: EntityKind, rows: Vec<Value>) -> DomainResult<Vec<Value>> {
        let mut created = Vec::with_capacity(rows.len());
        for row in rows {
            created.push(self.insert(kind, row).await?);
        }
        Ok(created)
    }

    /// Patch the row matching `key`; `None` when nothing matched
    async fn update(&self, kind: EntityKind, key: RowKey, patch: Value) -> DomainResult<Option<Value>>;

    /// Delete a row by identity
    async fn delete(&self, kind: EntityKind, id: RecordId) -> DomainResult<()>;

    /// Store a blob without overwriting, returning its stored path
    async fn upload_blob(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> DomainResult<String>;

    /// Public URL for a stored blob
    fn public_url(&self, bucket: &str, path: &str) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_names() {
        let tables: Vec<_> = EntityKind::ALL.iter().map(EntityKind::table).collect();
        assert_eq!(tables, vec!["events", "inventory", "leaderboard", "proofs"]);
    }

    #[test]
    fn test_row_key() {
        assert_eq!(RowKey::Id(RecordId(3)).column(), "id");
        assert_eq!(RowKey::Name("erlend".into()).value_string(), "erlend");
    }
}
