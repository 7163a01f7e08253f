//! Application Configuration
//!
//! Read from `kollektiv.json` (every field optional), then overridden by
//! `KOLLEKTIV_*` environment variables.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::domain::{DomainError, DomainResult};

pub const CONFIG_FILE: &str = "kollektiv.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub supabase_url: Option<String>,
    pub supabase_key: Option<String>,
    /// Local database and blob directory
    pub data_dir: PathBuf,
    pub log_dir: PathBuf,
    /// Storage bucket for proof photos
    pub bucket: String,
    pub save_delay_ms: u64,
    pub alert_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            supabase_url: None,
            supabase_key: None,
            data_dir: PathBuf::from("kollektiv-data"),
            log_dir: PathBuf::from("kollektiv-data/logs"),
            bucket: "proofs".to_string(),
            save_delay_ms: 300,
            alert_ms: 4000,
        }
    }
}

/// Where records live
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    Supabase { url: String, key: String },
    Local { db_path: PathBuf, blob_root: PathBuf },
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl AppConfig {
    /// Read the config file; a missing file yields the defaults
    pub fn load(path: &Path) -> DomainResult<Self> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| DomainError::InvalidInput(format!("{}: {}", path.display(), e)))
    }

    /// File first, then the process environment
    pub fn from_file_and_env(path: &Path) -> DomainResult<Self> {
        let mut config = Self::load(path)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply `KOLLEKTIV_*` overrides from `lookup`
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("KOLLEKTIV_SUPABASE_URL") {
            self.supabase_url = Some(url);
        }
        if let Some(key) = lookup("KOLLEKTIV_SUPABASE_KEY") {
            self.supabase_key = Some(key);
        }
        if let Some(dir) = lookup("KOLLEKTIV_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("KOLLEKTIV_LOG_DIR") {
            self.log_dir = PathBuf::from(dir);
        }
        if let Some(bucket) = lookup("KOLLEKTIV_BUCKET") {
            self.bucket = bucket;
        }
        for (key, slot) in [
            ("KOLLEKTIV_SAVE_DELAY_MS", &mut self.save_delay_ms),
            ("KOLLEKTIV_ALERT_MS", &mut self.alert_ms),
        ] {
            if let Some(raw) = lookup(key) {
                match raw.trim().parse() {
                    Ok(ms) => *slot = ms,
                    Err(_) => log::warn!("Ignoring {}={:?}: not a number of milliseconds", key, raw),
                }
            }
        }
    }

    /// Supabase when both URL and key are set, the local store otherwise
    pub fn backend(&self) -> Backend {
        match (non_blank(&self.supabase_url), non_blank(&self.supabase_key)) {
            (Some(url), Some(key)) => Backend::Supabase {
                url: url.to_string(),
                key: key.to_string(),
            },
            _ => Backend::Local {
                db_path: self.data_dir.join("kollektiv.db"),
                blob_root: self.data_dir.join("blobs"),
            },
        }
    }

    pub fn save_delay(&self) -> Duration {
        Duration::from_millis(self.save_delay_ms)
    }

    pub fn alert_duration(&self) -> Duration {
        Duration::from_millis(self.alert_ms)
    }
}
