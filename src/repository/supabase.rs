//! Hosted Backend
//!
//! `Gateway` over a Supabase project: PostgREST for tables and the storage
//! API for blobs. Authenticates with the project's anon key.

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::{RequestBuilder, Response};
use serde_json::Value;

use crate::domain::{DomainError, DomainResult, RecordId};
use super::traits::{EntityKind, Gateway, RowKey};

/// Escape everything except unreserved characters in filter values
const QUERY_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');

/// Same as `QUERY_ESCAPE` but keeps path separators
const PATH_ESCAPE: &AsciiSet = &QUERY_ESCAPE.remove(b'/');

pub struct SupabaseGateway {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl SupabaseGateway {
    pub fn new(http: reqwest::Client, base_url: &str, api_key: String) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.base_url.is_empty() && !self.api_key.is_empty()
    }

    fn table_url(&self, kind: EntityKind) -> String {
        format!("{}/rest/v1/{}", self.base_url, kind.table())
    }

    fn object_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url,
            utf8_percent_encode(bucket, QUERY_ESCAPE),
            utf8_percent_encode(path, PATH_ESCAPE)
        )
    }

    fn authed(&self, req: RequestBuilder) -> RequestBuilder {
        req.header("apikey", &self.api_key).bearer_auth(&self.api_key)
    }
}

/// PostgREST equality filter, e.g. `name=eq.erlend`
pub fn eq_filter(key: &RowKey) -> String {
    format!(
        "{}=eq.{}",
        key.column(),
        utf8_percent_encode(&key.value_string(), QUERY_ESCAPE)
    )
}

/// Turn a non-2xx response into a backend error carrying the body
async fn check(resp: Response, what: &str) -> DomainResult<Response> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status();
    let text: String = resp.text().await.unwrap_or_default().chars().take(300).collect();
    Err(DomainError::Backend(format!("{}: {} {}", what, status, text)))
}

async fn rows(resp: Response, what: &str) -> DomainResult<Vec<Value>> {
    let resp = check(resp, what).await?;
    resp.json::<Vec<Value>>()
        .await
        .map_err(|e| DomainError::Backend(format!("{}: unreadable body: {}", what, e)))
}

#[async_trait]
impl Gateway for SupabaseGateway {
    async fn list(&self, kind: EntityKind) -> DomainResult<Vec<Value>> {
        let resp = self
            .authed(self.http.get(self.table_url(kind)))
            .query(&[("select", "*")])
            .send()
            .await?;
        rows(resp, &format!("list {}", kind.table())).await
    }

    async fn insert(&self, kind: EntityKind, row: Value) -> DomainResult<Value> {
        let what = format!("insert {}", kind.table());
        let resp = self
            .authed(self.http.post(self.table_url(kind)))
            .header("Prefer", "return=representation")
            .json(&row)
            .send()
            .await?;
        rows(resp, &what)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::Backend(format!("{}: no row returned", what)))
    }

    async fn insert_many(&self, kind: EntityKind, rows_in: Vec<Value>) -> DomainResult<Vec<Value>> {
        let resp = self
            .authed(self.http.post(self.table_url(kind)))
            .header("Prefer", "return=representation")
            .json(&rows_in)
            .send()
            .await?;
        rows(resp, &format!("insert {}", kind.table())).await
    }

    async fn update(&self, kind: EntityKind, key: RowKey, patch: Value) -> DomainResult<Option<Value>> {
        let url = format!("{}?{}", self.table_url(kind), eq_filter(&key));
        let resp = self
            .authed(self.http.patch(url))
            .header("Prefer", "return=representation")
            .json(&patch)
            .send()
            .await?;
        Ok(rows(resp, &format!("update {}", kind.table())).await?.into_iter().next())
    }

    async fn delete(&self, kind: EntityKind, id: RecordId) -> DomainResult<()> {
        let url = format!("{}?{}", self.table_url(kind), eq_filter(&RowKey::Id(id)));
        let resp = self.authed(self.http.delete(url)).send().await?;
        check(resp, &format!("delete {}", kind.table())).await?;
        Ok(())
    }

    async fn upload_blob(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> DomainResult<String> {
        let resp = self
            .authed(self.http.post(self.object_url(bucket, path)))
            .header("Content-Type", content_type)
            .header("x-upsert", "false")
            .body(bytes)
            .send()
            .await?;
        check(resp, &format!("upload {}/{}", bucket, path)).await?;
        Ok(path.to_string())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url,
            utf8_percent_encode(bucket, QUERY_ESCAPE),
            utf8_percent_encode(path, PATH_ESCAPE)
        )
    }
}
