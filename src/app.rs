//! Application Context
//!
//! `App` bundles the state store, the gateway, the save scheduler and the
//! alert slot. Command handlers take `&App`.

use std::sync::Arc;
use std::time::Duration;

use crate::alert::AlertNotifier;
use crate::config::{AppConfig, Backend};
use crate::domain::{DomainError, DomainResult};
use crate::repository::{Gateway, SqliteGateway, SupabaseGateway};
use crate::scheduler::SaveScheduler;
use crate::store::{shared, AppState, SharedState};

pub struct App {
    pub state: SharedState,
    pub(crate) gateway: Arc<dyn Gateway>,
    pub scheduler: SaveScheduler,
    pub alerts: AlertNotifier,
    /// Storage bucket for proof photos
    pub(crate) bucket: String,
}

impl App {
    pub fn new(gateway: Arc<dyn Gateway>, config: &AppConfig) -> Self {
        Self::with_timings(gateway, &config.bucket, config.save_delay(), config.alert_duration())
    }

    pub fn with_timings(gateway: Arc<dyn Gateway>, bucket: &str, save_delay: Duration, alert_after: Duration) -> Self {
        let state = shared(AppState::new());
        let scheduler = SaveScheduler::new(state.clone(), gateway.clone(), save_delay);
        Self {
            state,
            gateway,
            scheduler,
            alerts: AlertNotifier::new(alert_after),
            bucket: bucket.to_string(),
        }
    }

    /// Copy of the current state for rendering
    pub async fn snapshot(&self) -> AppState {
        self.state.lock().await.clone()
    }

    /// Write every pending quantity change
    pub async fn shutdown(&self) {
        let flushed = self.scheduler.flush().await;
        if flushed > 0 {
            log::info!("Flushed {} pending save(s)", flushed);
        }
    }
}

/// Build the gateway selected by `config`
pub fn connect(config: &AppConfig) -> DomainResult<Arc<dyn Gateway>> {
    match config.backend() {
        Backend::Supabase { url, key } => {
            let http = reqwest::Client::builder()
                .user_agent(format!("kollektiv/{}", env!("CARGO_PKG_VERSION")))
                .timeout(Duration::from_secs(30))
                .build()?;
            let gateway = SupabaseGateway::new(http, &url, key);
            if !gateway.is_configured() {
                return Err(DomainError::InvalidInput("Supabase URL or key is empty".to_string()));
            }
            log::info!("Using hosted backend at {}", url);
            Ok(Arc::new(gateway))
        }
        Backend::Local { db_path, blob_root } => {
            log::info!("Using local database {}", db_path.display());
            Ok(Arc::new(SqliteGateway::open(&db_path, blob_root)?))
        }
    }
}
