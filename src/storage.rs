use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result, anyhow};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::activity_log::ActivityLog;
use crate::model::Player;

pub const FAVORITES_KEY: &str = "nba_favorites";
pub const SEARCH_HISTORY_KEY: &str = "nba_search_history";

/// Raw string key-value persistence.
///
/// Values are read and written wholesale; there are no partial updates.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str);
}

/// One JSON file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{safe}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.path_for(key)).ok()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir).context("create storage dir")?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).context("write storage entry")?;
        fs::rename(&tmp, &path).context("swap storage entry")?;
        Ok(())
    }

    fn remove(&self, key: &str) {
        let _ = fs::remove_file(self.path_for(key));
    }
}

/// In-process store, optionally limited to a byte quota across all keys.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
    quota_bytes: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            entries: Arc::default(),
            quota_bytes: Some(quota_bytes),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries
            .lock()
            .map(|e| e.contains_key(key))
            .unwrap_or(false)
    }

    /// Writes a raw value, bypassing the quota. Used to seed corrupted data.
    pub fn put_raw(&self, key: &str, value: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), value.to_string());
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow!("memory store lock poisoned"))?;
        if let Some(quota) = self.quota_bytes {
            let others: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            if others + key.len() + value.len() > quota {
                return Err(anyhow!("storage quota exceeded ({quota} bytes)"));
            }
        }
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(key);
        }
    }
}

/// Storage capability for contexts without persistent storage access.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopStore;

impl KeyValueStore for NoopStore {
    fn get(&self, _key: &str) -> Option<String> {
        None
    }

    fn set(&self, _key: &str, _value: &str) -> Result<()> {
        Ok(())
    }

    fn remove(&self, _key: &str) {}
}

/// Records that can be validated by a non-empty identity field.
pub trait Entity: Serialize + DeserializeOwned {
    const ID_FIELD: &'static str;
}

impl Entity for Player {
    const ID_FIELD: &'static str = "idPlayer";
}

/// JSON sequence persistence with self-healing reads.
///
/// Corrupted, non-array, or empty stored values are treated as absent and
/// the key is deleted. Write failures are logged and swallowed; the caller's
/// in-memory state stays authoritative.
#[derive(Clone)]
pub struct PersistentStore {
    backend: Arc<dyn KeyValueStore>,
    log: ActivityLog,
}

impl PersistentStore {
    pub fn new(backend: Arc<dyn KeyValueStore>, log: ActivityLog) -> Self {
        Self { backend, log }
    }

    pub fn noop(log: ActivityLog) -> Self {
        Self::new(Arc::new(NoopStore), log)
    }

    /// Loads a plain sequence (e.g. strings).
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        let Some(items) = self.load_array(key) else {
            return Vec::new();
        };
        match serde_json::from_value::<Vec<T>>(Value::Array(items)) {
            Ok(values) => values,
            Err(err) => {
                self.log
                    .warn(format!("Storage '{key}' has invalid entries, clearing: {err}"));
                self.backend.remove(key);
                Vec::new()
            }
        }
    }

    /// Loads an entity sequence, dropping elements that fail the shape check
    /// and writing the cleaned sequence back when anything was dropped.
    pub fn load_entities<T: Entity>(&self, key: &str) -> Vec<T> {
        let Some(items) = self.load_array(key) else {
            return Vec::new();
        };
        let total = items.len();
        let valid: Vec<T> = items
            .into_iter()
            .filter(has_identity::<T>)
            .filter_map(|item| serde_json::from_value::<T>(item).ok())
            .collect();

        if valid.is_empty() {
            self.log
                .warn(format!("Storage '{key}' held no valid entries, clearing"));
            self.backend.remove(key);
            return Vec::new();
        }
        if valid.len() != total {
            self.log.info(format!(
                "Storage '{key}' repaired: kept {}/{total} entries",
                valid.len()
            ));
            self.save(key, &valid);
        }
        valid
    }

    pub fn save<T: Serialize>(&self, key: &str, values: &[T]) {
        let json = match serde_json::to_string(values) {
            Ok(json) => json,
            Err(err) => {
                self.log
                    .error(format!("Storage '{key}' serialize failed: {err}"));
                return;
            }
        };
        if let Err(err) = self.backend.set(key, &json) {
            self.log.error(format!("Storage '{key}' write failed: {err:#}"));
        }
    }

    pub fn clear(&self, key: &str) {
        self.backend.remove(key);
    }

    fn load_array(&self, key: &str) -> Option<Vec<Value>> {
        let raw = self.backend.get(key)?;
        let parsed = match serde_json::from_str::<Value>(&raw) {
            Ok(parsed) => parsed,
            Err(err) => {
                self.log
                    .warn(format!("Storage '{key}' is not valid JSON, clearing: {err}"));
                self.backend.remove(key);
                return None;
            }
        };
        match parsed {
            Value::Array(items) if !items.is_empty() => Some(items),
            _ => {
                self.log
                    .info(format!("Storage '{key}' empty or not an array, clearing"));
                self.backend.remove(key);
                None
            }
        }
    }
}

fn has_identity<T: Entity>(item: &Value) -> bool {
    let Some(obj) = item.as_object() else {
        return false;
    };
    match obj.get(T::ID_FIELD) {
        Some(Value::String(id)) => !id.trim().is_empty(),
        Some(Value::Number(_)) => true,
        _ => false,
    }
}
