//! Tunable settings and the external configuration store
//!
//! The exclusion list is persisted through a [`SettingsStore`] as one
//! colon-delimited string under [`EXCLUDE_DIRS_KEY`], the same shape the
//! host editor's configuration uses. Result caps and timer intervals are
//! plain constants on [`Settings`] with builder-style overrides.

use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

/// Setting name under which the exclusion list is stored.
pub const EXCLUDE_DIRS_KEY: &str = "excludeDirs";

/// Tunable constants of the indexing and query core.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Ceiling on substring matches per query
    pub max_strong_results: usize,

    /// Ceiling on fuzzy matches per query
    pub max_fuzzy_results: usize,

    /// Strong matches accumulated before a batch is flushed to the caller
    pub result_batch_size: usize,

    /// Most recently opened files kept per workspace
    pub recency_cap: usize,

    /// How often the dirty recency list is flushed to disk
    pub flush_interval: Duration,

    /// Keystroke debounce before a query actually runs
    pub query_debounce: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_strong_results: 300,
            max_fuzzy_results: 100,
            result_batch_size: 25,
            recency_cap: 25,
            flush_interval: Duration::from_secs(10),
            query_debounce: Duration::from_millis(200),
        }
    }
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the strong-match ceiling
    pub fn with_max_strong_results(mut self, max: usize) -> Self {
        self.max_strong_results = max;
        self
    }

    /// Set the fuzzy-match ceiling
    pub fn with_max_fuzzy_results(mut self, max: usize) -> Self {
        self.max_fuzzy_results = max;
        self
    }

    /// Set the recency list capacity
    pub fn with_recency_cap(mut self, cap: usize) -> Self {
        self.recency_cap = cap;
        self
    }

    /// Set the recency flush interval
    pub fn with_flush_interval(mut self, interval: Duration) -> Self {
        self.flush_interval = interval;
        self
    }
}

/// External key/value configuration store.
///
/// The host editor supplies its own implementation; the CLI uses
/// [`JsonSettingsStore`]. The core only ever reads and writes whole string
/// values.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    async fn get(&self, key: &str) -> Option<String>;

    /// Write `value` under `key` and persist it.
    async fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Settings store backed by one JSON file.
///
/// The file is read lazily and memoized; writes stage to a `.new` sibling
/// and atomically rename over the previous copy.
pub struct JsonSettingsStore {
    path: PathBuf,
    values: Mutex<Option<HashMap<String, String>>>,
}

impl JsonSettingsStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            values: Mutex::new(None),
        }
    }

    async fn load_into(&self, slot: &mut Option<HashMap<String, String>>) {
        if slot.is_some() {
            return;
        }
        let values = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                debug!("settings file {} is not valid JSON: {}", self.path.display(), e);
                HashMap::new()
            }),
            Err(e) => {
                debug!("no settings file at {}: {}", self.path.display(), e);
                HashMap::new()
            }
        };
        *slot = Some(values);
    }
}

#[async_trait]
impl SettingsStore for JsonSettingsStore {
    async fn get(&self, key: &str) -> Option<String> {
        let mut slot = self.values.lock().await;
        self.load_into(&mut slot).await;
        slot.as_ref().and_then(|values| values.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut slot = self.values.lock().await;
        self.load_into(&mut slot).await;
        let values = slot.as_mut().expect("settings loaded above");
        values.insert(key.to_string(), value.to_string());

        let staged = self.path.with_extension("json.new");
        let serialized = serde_json::to_string_pretty(&values)?;
        tokio::fs::write(&staged, serialized).await?;
        tokio::fs::rename(&staged, &self.path).await?;
        Ok(())
    }
}

/// In-memory settings store for tests and embedders without persistence.
#[derive(Default)]
pub struct MemorySettingsStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn get(&self, key: &str) -> Option<String> {
        self.values.lock().await.get(key).cloned()
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values.lock().await.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn json_store_round_trips() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("settings.json");

        let store = JsonSettingsStore::new(path.clone());
        assert_eq!(store.get(EXCLUDE_DIRS_KEY).await, None);
        store.set(EXCLUDE_DIRS_KEY, "${workspace}/build").await.unwrap();

        // fresh store reads the persisted file
        let reread = JsonSettingsStore::new(path);
        assert_eq!(
            reread.get(EXCLUDE_DIRS_KEY).await.as_deref(),
            Some("${workspace}/build")
        );
    }

    #[tokio::test]
    async fn corrupt_settings_file_reads_as_empty() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = JsonSettingsStore::new(path);
        assert_eq!(store.get(EXCLUDE_DIRS_KEY).await, None);
    }
}
