//! Access token storage
//!
//! The dashboard keeps exactly one credential, the admin access token, under
//! the `adminAccessToken` key. [`TokenStore`] is the accessor interface the
//! authenticated client is built on; two implementations are provided:
//! an in-memory store for tests and short-lived processes, and a JSON file
//! store that survives restarts.

use crate::constants::ACCESS_TOKEN_KEY;
use crate::error::Result;
use papaya::HashMap;
use serde_json::{Map, Value};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::warn;

/// Accessor for the persisted admin access token
pub trait TokenStore: Send + Sync + 'static {
    /// Current token, if any
    fn get(&self) -> Option<String>;

    /// Overwrite the token
    fn set(&self, token: &str) -> Result<()>;

    /// Remove the token
    fn clear(&self) -> Result<()>;
}

/// Thread-safe in-memory token store using Papaya HashMap
#[derive(Clone)]
pub struct MemoryTokenStore {
    entries: Arc<HashMap<String, String>>,
}

impl MemoryTokenStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            entries: Arc::new(HashMap::new()),
        }
    }

    /// Create a store already holding `token`
    pub fn with_token(token: impl Into<String>) -> Self {
        let store = Self::new();
        store.entries.pin().insert(ACCESS_TOKEN_KEY.to_string(), token.into());
        store
    }
}

impl Default for MemoryTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> Option<String> {
        self.entries.pin().get(ACCESS_TOKEN_KEY).cloned()
    }

    fn set(&self, token: &str) -> Result<()> {
        self.entries
            .pin()
            .insert(ACCESS_TOKEN_KEY.to_string(), token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.entries.pin().remove(ACCESS_TOKEN_KEY);
        Ok(())
    }
}

/// Token store backed by a JSON object on disk
///
/// The file holds a flat string map (`{"adminAccessToken": "..."}`); keys
/// other than the access token are preserved on write. The file is read on
/// every `get`, so a token written by another process is picked up.
pub struct FileTokenStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Store located under the user's local data directory
    pub fn default_location() -> Option<Self> {
        dirs::data_local_dir().map(|dir| Self::new(dir.join("aomail-admin").join("storage.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<Map<String, Value>> {
        match fs::read(&self.path) {
            Ok(bytes) if bytes.is_empty() => Ok(Map::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Map::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_entries(&self, entries: &Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(entries)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn update<F>(&self, apply: F) -> Result<()>
    where
        F: FnOnce(&mut Map<String, Value>),
    {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut entries = self.read_entries()?;
        apply(&mut entries);
        self.write_entries(&entries)
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self) -> Option<String> {
        match self.read_entries() {
            Ok(entries) => entries
                .get(ACCESS_TOKEN_KEY)
                .and_then(Value::as_str)
                .map(str::to_string),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to read token storage");
                None
            }
        }
    }

    fn set(&self, token: &str) -> Result<()> {
        self.update(|entries| {
            entries.insert(ACCESS_TOKEN_KEY.to_string(), Value::String(token.to_string()));
        })
    }

    fn clear(&self) -> Result<()> {
        self.update(|entries| {
            entries.remove(ACCESS_TOKEN_KEY);
        })
    }
}
