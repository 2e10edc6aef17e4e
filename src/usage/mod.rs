mod config_url;
mod format;

pub use config_url::*;
pub use format::*;

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::api::{Backend, ClientRecord, ConfigEntry};
use crate::auth::SessionStore;
use crate::error::ClientError;
use crate::mount::Mount;

pub const CONFIGS_FETCH_FAILED: &str = "Error fetching configs.";
pub const CONFIGS_NETWORK_ERROR: &str = "Network error.";
pub const CONFIGS_NOT_AUTHENTICATED: &str = "Not authenticated. Please log in.";

/// Usage numbers for one config, recomputed on every render
#[derive(Debug, Clone, PartialEq)]
pub struct UsagePresentation {
    pub used: u64,
    pub total: u64,
    pub remain: u64,
    pub percent_used: f64,
    pub expiry_label: String,
}

impl UsagePresentation {
    pub fn from_record(record: &ClientRecord) -> Self {
        Self::with_expiry_label(record, format_expiry(record.expiry_time))
    }

    pub fn with_expiry_label(record: &ClientRecord, expiry_label: String) -> Self {
        let used = record.up.saturating_add(record.down);
        let total = record.total;

        Self {
            used,
            total,
            remain: total.saturating_sub(used),
            percent_used: percent_used(used, total),
            expiry_label,
        }
    }

    /// "Used: 500.00 MB / Total: 1.00 GB | Remain: 524.00 MB"
    pub fn traffic_line(&self) -> String {
        format!(
            "Used: {} / Total: {} | Remain: {}",
            format_bytes(self.used),
            format_bytes(self.total),
            format_bytes(self.remain)
        )
    }
}

/// Share of the allowance consumed, clamped to 0..=100; unlimited is 0
pub fn percent_used(used: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (used as f64 / total as f64 * 100.0).min(100.0)
}

/// Everything one config card shows
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigCard {
    pub key: String,
    pub url: String,
    pub usage: UsagePresentation,
}

impl ConfigCard {
    pub fn from_entry(index: usize, entry: &ConfigEntry) -> Self {
        let key = match &entry.client_config.id {
            Some(serde_json::Value::String(id)) if !id.is_empty() => id.clone(),
            Some(serde_json::Value::Number(id)) => id.to_string(),
            _ => index.to_string(),
        };

        Self {
            key,
            url: build_config_url(&entry.inbound, &entry.client_config),
            usage: UsagePresentation::from_record(&entry.client_config),
        }
    }
}

pub fn aggregate(entries: &[ConfigEntry]) -> Vec<ConfigCard> {
    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| ConfigCard::from_entry(index, entry))
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub enum UsageState {
    Loading,
    Loaded(Vec<ConfigCard>),
    Failed(String),
}

impl UsageState {
    pub fn cards(&self) -> &[ConfigCard] {
        match self {
            UsageState::Loaded(cards) => cards,
            _ => &[],
        }
    }
}

/// The "my configs" view: fetches the owned configs once per mount and keeps
/// the derived cards.
pub struct UsageView {
    backend: Arc<dyn Backend>,
    store: Arc<dyn SessionStore>,
    state: Mutex<UsageState>,
    started: AtomicBool,
    mount: Mount,
}

impl UsageView {
    pub fn mount(backend: Arc<dyn Backend>, store: Arc<dyn SessionStore>) -> Self {
        Self {
            backend,
            store,
            state: Mutex::new(UsageState::Loading),
            started: AtomicBool::new(false),
            mount: Mount::new(),
        }
    }

    pub fn state(&self) -> UsageState {
        self.state.lock().clone()
    }

    pub fn mount_handle(&self) -> Mount {
        self.mount.clone()
    }

    pub fn unmount(&self) {
        self.mount.teardown();
    }

    /// One-shot fetch; later calls return the current state. A fetch whose
    /// future is dropped before it settles does not count.
    pub async fn load(&self) -> UsageState {
        if self.started.swap(true, Ordering::SeqCst) {
            return self.state();
        }

        let token = match self.store.get() {
            Some(token) => token,
            None => {
                log::warn!("Usage view mounted without a session token");
                return self.apply(UsageState::Failed(CONFIGS_NOT_AUTHENTICATED.to_string()));
            }
        };

        let fetch = FetchGuard { started: &self.started };
        let outcome = self.backend.user_configs(&token).await;
        std::mem::forget(fetch);

        if !self.mount.is_alive() {
            log::debug!("Usage view torn down, discarding config list");
            return self.state();
        }

        let next = match outcome {
            Ok(response) if response.success => {
                let cards = aggregate(&response.into_entries());
                log::info!("Loaded {} configs", cards.len());
                UsageState::Loaded(cards)
            }
            Ok(response) => UsageState::Failed(configs_error_message(&ClientError::ServerError {
                message: response.msg,
            })),
            Err(e) => {
                log::error!("Failed to fetch configs: {}", e);
                UsageState::Failed(configs_error_message(&e))
            }
        };

        self.apply(next)
    }

    fn apply(&self, next: UsageState) -> UsageState {
        *self.state.lock() = next.clone();
        next
    }
}

// Re-arms `load` when a fetch is abandoned
struct FetchGuard<'a> {
    started: &'a AtomicBool,
}

impl Drop for FetchGuard<'_> {
    fn drop(&mut self) {
        self.started.store(false, Ordering::SeqCst);
    }
}

fn configs_error_message(err: &ClientError) -> String {
    match err {
        ClientError::ServerError { .. } | ClientError::Rejected { .. } => {
            err.server_message().unwrap_or(CONFIGS_FETCH_FAILED).to_string()
        }
        ClientError::NotAuthenticated => CONFIGS_NOT_AUTHENTICATED.to_string(),
        ClientError::Transport(_) | ClientError::Malformed(_) => CONFIGS_NETWORK_ERROR.to_string(),
        _ => CONFIGS_FETCH_FAILED.to_string(),
    }
}
