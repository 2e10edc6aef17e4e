use anyhow::{Context, Result};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::ClientConfig;
use crate::error::ClientError;

pub const SESSION_TOKEN_KEY: &str = "onwardpath_session_token";
pub const STORAGE_FILE_NAME: &str = "storage.json";

/// Holder of the single bearer credential.
///
/// `get` never fails: a slot that cannot be read is reported as absent so
/// callers fall back to the logged-out path. Last write wins.
pub trait SessionStore: Send + Sync {
    fn get(&self) -> Option<String>;
    fn set(&self, token: &str) -> Result<(), ClientError>;
    fn clear(&self) -> Result<(), ClientError>;

    fn is_logged_in(&self) -> bool {
        self.get().is_some()
    }
}

fn storage_error(err: anyhow::Error) -> ClientError {
    ClientError::Storage(format!("{:#}", err))
}

// Empty strings count as logged out
fn non_empty(token: Option<String>) -> Option<String> {
    token.filter(|t| !t.is_empty())
}

/// Key/value file that survives restarts, one JSON object per origin-like
/// storage directory.
pub struct FileSessionStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileSessionStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(STORAGE_FILE_NAME),
            lock: Mutex::new(()),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let dir = config.resolved_storage_dir()?;
        Ok(Self::new(dir))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_slots(&self) -> Result<HashMap<String, String>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }

        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;

        if raw.trim().is_empty() {
            return Ok(HashMap::new());
        }

        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse {}", self.path.display()))
    }

    fn write_slots(&self, slots: &HashMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let json = serde_json::to_string_pretty(slots).context("Failed to serialize storage")?;

        // Write next to the target and rename so a crash never leaves half a file
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).with_context(|| format!("Failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;

        Ok(())
    }

    fn update(&self, apply: impl FnOnce(&mut HashMap<String, String>)) -> Result<()> {
        let _guard = self.lock.lock();
        let mut slots = self.read_slots().unwrap_or_else(|e| {
            log::warn!("Discarding unreadable session storage: {:#}", e);
            HashMap::new()
        });
        apply(&mut slots);
        self.write_slots(&slots)
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self) -> Option<String> {
        let _guard = self.lock.lock();
        match self.read_slots() {
            Ok(mut slots) => non_empty(slots.remove(SESSION_TOKEN_KEY)),
            Err(e) => {
                log::warn!("Session storage unreadable, treating as logged out: {:#}", e);
                None
            }
        }
    }

    fn set(&self, token: &str) -> Result<(), ClientError> {
        self.update(|slots| {
            slots.insert(SESSION_TOKEN_KEY.to_string(), token.to_string());
        })
        .map_err(storage_error)?;

        log::info!("Session token stored at {}", self.path.display());
        Ok(())
    }

    fn clear(&self) -> Result<(), ClientError> {
        self.update(|slots| {
            slots.remove(SESSION_TOKEN_KEY);
        })
        .map_err(storage_error)?;

        log::info!("Session token cleared");
        Ok(())
    }
}

/// In-process store; nothing outlives the process
#[derive(Default)]
pub struct MemorySessionStore {
    slots: Mutex<HashMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        let store = Self::new();
        store
            .slots
            .lock()
            .insert(SESSION_TOKEN_KEY.to_string(), token.to_string());
        store
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self) -> Option<String> {
        non_empty(self.slots.lock().get(SESSION_TOKEN_KEY).cloned())
    }

    fn set(&self, token: &str) -> Result<(), ClientError> {
        self.slots
            .lock()
            .insert(SESSION_TOKEN_KEY.to_string(), token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), ClientError> {
        self.slots.lock().remove(SESSION_TOKEN_KEY);
        Ok(())
    }
}
