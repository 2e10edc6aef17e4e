//! Client configuration

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

pub const DEFAULT_API_URL: &str = "http://localhost:3000";
pub const REQUEST_TIMEOUT_SECS: u64 = 30;
pub const APP_DIR_NAME: &str = "onwardpath";

/// Where the client talks to and where it keeps its session slot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Origin serving the `/api/*` endpoints
    pub base_url: String,

    /// Upper bound for every request, in seconds
    pub request_timeout_secs: u64,

    /// Directory holding the persistent key/value file.
    /// Falls back to the platform data directory when unset.
    pub storage_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            request_timeout_secs: REQUEST_TIMEOUT_SECS,
            storage_dir: None,
        }
    }
}

impl ClientConfig {
    /// Defaults overlaid with `ONWARDPATH_API_URL`, `ONWARDPATH_TIMEOUT_SECS`
    /// and `ONWARDPATH_STORAGE_DIR`.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(url) = env::var("ONWARDPATH_API_URL") {
            config.base_url = url;
        }

        if let Ok(timeout) = env::var("ONWARDPATH_TIMEOUT_SECS") {
            config.request_timeout_secs = timeout
                .trim()
                .parse()
                .with_context(|| format!("Invalid ONWARDPATH_TIMEOUT_SECS: {}", timeout))?;
        }

        if let Ok(dir) = env::var("ONWARDPATH_STORAGE_DIR") {
            config.storage_dir = Some(PathBuf::from(dir));
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.base_url)
            .with_context(|| format!("Invalid API base URL: {}", self.base_url))?;

        if !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!("API base URL must be http or https, got {}", url.scheme());
        }

        if self.request_timeout_secs == 0 {
            anyhow::bail!("Request timeout must be at least one second");
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Base URL without a trailing slash, ready for `format!("{}/api/...")`
    pub fn api_root(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    pub fn resolved_storage_dir(&self) -> Result<PathBuf> {
        match &self.storage_dir {
            Some(dir) => Ok(dir.clone()),
            None => dirs::data_dir()
                .map(|dir| dir.join(APP_DIR_NAME))
                .context("No platform data directory available"),
        }
    }
}
