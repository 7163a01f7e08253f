//! Local SQLite Backend
//!
//! A `Gateway` over a SQLite file, with blobs kept in a directory next to it.
//! Used when no hosted backend is configured.

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{params_from_iter, Connection};
use serde_json::{Map, Value};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::domain::{DomainError, DomainResult, RecordId};
use super::traits::{EntityKind, Gateway, RowKey};

/// Characters escaped in `file://` URLs
const PATH_ESCAPE: &AsciiSet = &CONTROLS.add(b' ').add(b'"').add(b'#').add(b'%').add(b'?');

/// SQLite implementation of the gateway
pub struct SqliteGateway {
    conn: Arc<Mutex<Connection>>,
    blob_root: PathBuf,
}

impl SqliteGateway {
    /// Open (creating if needed) the database at `db_path` and run migrations
    pub fn open(db_path: &Path, blob_root: PathBuf) -> DomainResult<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(db_path)?;
        Self::with_connection(conn, blob_root)
    }

    /// Throwaway database, used by tests
    pub fn in_memory(blob_root: PathBuf) -> DomainResult<Self> {
        Self::with_connection(Connection::open_in_memory()?, blob_root)
    }

    fn with_connection(conn: Connection, blob_root: PathBuf) -> DomainResult<Self> {
        run_migrations(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            blob_root,
        })
    }
}

/// Create tables if they don't exist
fn run_migrations(conn: &Connection) -> DomainResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS events (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            \"date\" TEXT NOT NULL,
            title TEXT NOT NULL,
            note TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_events_date ON events(\"date\");

        CREATE TABLE IF NOT EXISTS inventory (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            \"type\" TEXT NOT NULL DEFAULT 'count',
            \"min\" INTEGER,
            \"max\" INTEGER,
            qty INTEGER
        );

        CREATE TABLE IF NOT EXISTS leaderboard (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            score INTEGER DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS proofs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_name TEXT NOT NULL,
            task TEXT NOT NULL,
            photo_url TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );",
    )?;
    Ok(())
}

/// Writable columns per table (identity excluded)
fn columns(kind: EntityKind) -> &'static [&'static str] {
    match kind {
        EntityKind::Events => &["date", "title", "note"],
        EntityKind::Inventory => &["name", "type", "min", "max", "qty"],
        EntityKind::Leaderboard => &["name", "score"],
        EntityKind::Proofs => &["user_name", "task", "photo_url", "created_at"],
    }
}

fn select_sql(kind: EntityKind) -> String {
    let cols: Vec<String> = std::iter::once("id")
        .chain(columns(kind).iter().copied())
        .map(|c| format!("\"{}\"", c))
        .collect();
    format!("SELECT {} FROM {}", cols.join(", "), kind.table())
}

/// Known columns present in `row`, with their values
fn pick_columns(kind: EntityKind, row: &Value) -> DomainResult<Vec<(&'static str, SqlValue)>> {
    let object = row
        .as_object()
        .ok_or_else(|| DomainError::InvalidInput(format!("{} row is not an object", kind.table())))?;
    Ok(columns(kind)
        .iter()
        .filter_map(|col| object.get(*col).map(|v| (*col, json_to_sql(v))))
        .collect())
}

fn json_to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => n.as_f64().map(SqlValue::Real).unwrap_or(SqlValue::Null),
        },
        Value::String(s) => SqlValue::Text(s.clone()),
        other => SqlValue::Text(other.to_string()),
    }
}

fn sql_to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null | ValueRef::Blob(_) => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
    }
}

/// Run a SELECT and turn each row into a JSON object keyed by column name
fn query_rows(conn: &Connection, sql: &str, params: Vec<SqlValue>) -> DomainResult<Vec<Value>> {
    let mut stmt = conn.prepare(sql)?;
    let names: Vec<String> = stmt.column_names().iter().map(|n| n.to_string()).collect();
    let rows = stmt.query_map(params_from_iter(params), |row| {
        let mut object = Map::new();
        for (i, name) in names.iter().enumerate() {
            object.insert(name.clone(), sql_to_json(row.get_ref(i)?));
        }
        Ok(Value::Object(object))
    })?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

fn insert_row(conn: &Connection, kind: EntityKind, row: &Value) -> DomainResult<Value> {
    let picked = pick_columns(kind, row)?;
    let sql = if picked.is_empty() {
        format!("INSERT INTO {} DEFAULT VALUES", kind.table())
    } else {
        let cols: Vec<String> = picked.iter().map(|(c, _)| format!("\"{}\"", c)).collect();
        let marks: Vec<String> = (1..=picked.len()).map(|i| format!("?{}", i)).collect();
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            kind.table(),
            cols.join(", "),
            marks.join(", ")
        )
    };
    let values: Vec<SqlValue> = picked.into_iter().map(|(_, v)| v).collect();
    conn.execute(&sql, params_from_iter(values))?;

    let id = conn.last_insert_rowid();
    let sql = format!("{} WHERE id = ?1", select_sql(kind));
    query_rows(conn, &sql, vec![SqlValue::Integer(id)])?
        .into_iter()
        .next()
        .ok_or_else(|| DomainError::Internal(format!("{} row {} vanished after insert", kind.table(), id)))
}

fn key_value(key: &RowKey) -> SqlValue {
    match key {
        RowKey::Id(id) => SqlValue::Integer(id.0),
        RowKey::Name(name) => SqlValue::Text(name.clone()),
    }
}

/// Reject absolute paths and `..` so blobs stay under the bucket directory
fn safe_relative(path: &str) -> DomainResult<PathBuf> {
    let relative = Path::new(path);
    let clean = !path.is_empty()
        && relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
    if clean {
        Ok(relative.to_path_buf())
    } else {
        Err(DomainError::InvalidInput(format!("invalid blob path '{}'", path)))
    }
}

#[async_trait]
impl Gateway for SqliteGateway {
    async fn list(&self, kind: EntityKind) -> DomainResult<Vec<Value>> {
        let conn = self.conn.lock().await;
        let sql = format!("{} ORDER BY id ASC", select_sql(kind));
        query_rows(&conn, &sql, Vec::new())
    }

    async fn insert(&self, kind: EntityKind, row: Value) -> DomainResult<Value> {
        let conn = self.conn.lock().await;
        insert_row(&conn, kind, &row)
    }

    async fn insert_many(&self, kind: EntityKind, rows: Vec<Value>) -> DomainResult<Vec<Value>> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;
        let mut created = Vec::with_capacity(rows.len());
        for row in &rows {
            created.push(insert_row(&tx, kind, row)?);
        }
        tx.commit()?;
        Ok(created)
    }

    async fn update(&self, kind: EntityKind, key: RowKey, patch: Value) -> DomainResult<Option<Value>> {
        let conn = self.conn.lock().await;
        let picked = pick_columns(kind, &patch)?;

        if !picked.is_empty() {
            let sets: Vec<String> = picked
                .iter()
                .enumerate()
                .map(|(i, (c, _))| format!("\"{}\" = ?{}", c, i + 1))
                .collect();
            let sql = format!(
                "UPDATE {} SET {} WHERE \"{}\" = ?{}",
                kind.table(),
                sets.join(", "),
                key.column(),
                picked.len() + 1
            );
            let mut values: Vec<SqlValue> = picked.into_iter().map(|(_, v)| v).collect();
            values.push(key_value(&key));
            if conn.execute(&sql, params_from_iter(values))? == 0 {
                return Ok(None);
            }
        }

        let sql = format!("{} WHERE \"{}\" = ?1 LIMIT 1", select_sql(kind), key.column());
        Ok(query_rows(&conn, &sql, vec![key_value(&key)])?.into_iter().next())
    }

    async fn delete(&self, kind: EntityKind, id: RecordId) -> DomainResult<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            &format!("DELETE FROM {} WHERE id = ?1", kind.table()),
            [id.0],
        )?;
        Ok(())
    }

    async fn upload_blob(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        _content_type: &str,
    ) -> DomainResult<String> {
        let target = self
            .blob_root
            .join(safe_relative(bucket)?)
            .join(safe_relative(path)?);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(DomainError::Conflict(format!("blob {}/{} already exists", bucket, path)));
            }
            Err(e) => return Err(e.into()),
        };
        file.write_all(&bytes).await?;
        file.flush().await?;
        Ok(path.to_string())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        let full = self.blob_root.join(bucket).join(path);
        let full = full.to_string_lossy().replace('\\', "/");
        let full = if full.starts_with('/') { full } else { format!("/{}", full) };
        format!("file://{}", utf8_percent_encode(&full, PATH_ESCAPE))
    }
}
