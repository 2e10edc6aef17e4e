use anyhow::{Context, Result};
use std::sync::Arc;

use crate::api::{ApiClient, Backend};
use crate::auth::{AccountService, FileSessionStore, SessionGate, SessionStore};
use crate::config::ClientConfig;
use crate::orders::OrderBuilder;
use crate::usage::UsageView;

/// Shared capabilities handed to every component
pub struct AppState {
    pub config: ClientConfig,
    pub backend: Arc<dyn Backend>,
    pub store: Arc<dyn SessionStore>,
}

impl AppState {
    /// Real backend plus the on-disk session slot
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let backend = ApiClient::new(&config).context("Failed to create API client")?;
        let store =
            FileSessionStore::from_config(&config).context("Failed to open session storage")?;
        log::debug!("Session storage at {}", store.path().display());

        Ok(Self::with_parts(config, Arc::new(backend), Arc::new(store)))
    }

    pub fn with_parts(
        config: ClientConfig,
        backend: Arc<dyn Backend>,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            config,
            backend,
            store,
        }
    }

    pub fn accounts(&self) -> AccountService {
        AccountService::new(self.backend.clone(), self.store.clone())
    }

    pub fn gate(&self) -> SessionGate {
        SessionGate::mount(self.store.clone(), self.backend.clone())
    }

    pub fn order_builder(&self) -> OrderBuilder {
        OrderBuilder::new(self.backend.clone(), self.store.clone())
    }

    pub fn usage_view(&self) -> UsageView {
        UsageView::mount(self.backend.clone(), self.store.clone())
    }
}
