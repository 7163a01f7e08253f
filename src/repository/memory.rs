//! In-memory gateway for tests: records every call and can be told to fail.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use crate::domain::{DomainError, DomainResult, RecordId};
use super::traits::{EntityKind, Gateway, RowKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    List,
    Insert,
    Update,
    Delete,
    Upload,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub op: Op,
    pub kind: Option<EntityKind>,
    pub key: Option<RowKey>,
    pub payload: Value,
}

#[derive(Default)]
pub struct MemoryGateway {
    tables: Mutex<HashMap<EntityKind, Vec<Value>>>,
    blobs: Mutex<HashMap<String, Vec<u8>>>,
    failing: Mutex<HashSet<Op>>,
    calls: Mutex<Vec<Call>>,
    next_id: AtomicI64,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI64::new(1),
            ..Default::default()
        }
    }

    /// Pre-populate a table; rows keep the ids they carry
    pub fn with_rows(self, kind: EntityKind, rows: Vec<Value>) -> Self {
        for row in &rows {
            if let Some(id) = row.get("id").and_then(Value::as_i64) {
                self.next_id.fetch_max(id + 1, Ordering::SeqCst);
            }
        }
        self.tables.lock().unwrap().insert(kind, rows);
        self
    }

    pub fn fail(&self, op: Op) {
        self.failing.lock().unwrap().insert(op);
    }

    pub fn recover(&self, op: Op) {
        self.failing.lock().unwrap().remove(&op);
    }

    pub fn rows(&self, kind: EntityKind) -> Vec<Value> {
        self.tables.lock().unwrap().get(&kind).cloned().unwrap_or_default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Updates issued against `kind`, in order
    pub fn updates(&self, kind: EntityKind) -> Vec<(RowKey, Value)> {
        self.calls()
            .into_iter()
            .filter(|c| c.op == Op::Update && c.kind == Some(kind))
            .filter_map(|c| c.key.map(|k| (k, c.payload)))
            .collect()
    }

    pub fn blob(&self, path: &str) -> Option<Vec<u8>> {
        self.blobs.lock().unwrap().get(path).cloned()
    }

    fn record(&self, op: Op, kind: Option<EntityKind>, key: Option<RowKey>, payload: Value) -> DomainResult<()> {
        self.calls.lock().unwrap().push(Call { op, kind, key, payload });
        if self.failing.lock().unwrap().contains(&op) {
            return Err(DomainError::Backend(format!("{:?} refused", op)));
        }
        Ok(())
    }

    fn assign_id(&self, mut row: Value) -> Value {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        if let Some(object) = row.as_object_mut() {
            object.insert("id".to_string(), json!(id));
        }
        row
    }
}

fn matches(row: &Value, key: &RowKey) -> bool {
    match key {
        RowKey::Id(id) => row.get("id").and_then(Value::as_i64) == Some(id.0),
        RowKey::Name(name) => row.get("name").and_then(Value::as_str) == Some(name.as_str()),
    }
}

#[async_trait]
impl Gateway for MemoryGateway {
    async fn list(&self, kind: EntityKind) -> DomainResult<Vec<Value>> {
        self.record(Op::List, Some(kind), None, Value::Null)?;
        Ok(self.rows(kind))
    }

    async fn insert(&self, kind: EntityKind, row: Value) -> DomainResult<Value> {
        self.record(Op::Insert, Some(kind), None, row.clone())?;
        let mut created = self.assign_id(row);
        if kind == EntityKind::Proofs {
            if let Some(object) = created.as_object_mut() {
                let seq = object.get("id").and_then(Value::as_i64).unwrap_or(0);
                object
                    .entry("created_at")
                    .or_insert_with(|| json!(format!("2026-10-19T10:{:02}:00Z", seq % 60)));
            }
        }
        self.tables.lock().unwrap().entry(kind).or_default().push(created.clone());
        Ok(created)
    }

    async fn update(&self, kind: EntityKind, key: RowKey, patch: Value) -> DomainResult<Option<Value>> {
        self.record(Op::Update, Some(kind), Some(key.clone()), patch.clone())?;
        let mut tables = self.tables.lock().unwrap();
        let rows = tables.entry(kind).or_default();
        let Some(row) = rows.iter_mut().find(|r| matches(r, &key)) else {
            return Ok(None);
        };
        if let (Some(target), Some(fields)) = (row.as_object_mut(), patch.as_object()) {
            for (k, v) in fields {
                target.insert(k.clone(), v.clone());
            }
        }
        Ok(Some(row.clone()))
    }

    async fn delete(&self, kind: EntityKind, id: RecordId) -> DomainResult<()> {
        self.record(Op::Delete, Some(kind), Some(RowKey::Id(id)), Value::Null)?;
        let key = RowKey::Id(id);
        self.tables
            .lock()
            .unwrap()
            .entry(kind)
            .or_default()
            .retain(|r| !matches(r, &key));
        Ok(())
    }

    async fn upload_blob(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> DomainResult<String> {
        self.record(Op::Upload, None, None, json!({"bucket": bucket, "path": path, "content_type": content_type}))?;
        self.blobs.lock().unwrap().insert(path.to_string(), bytes);
        Ok(path.to_string())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("https://blobs.test/{}/{}", bucket, path)
    }
}
