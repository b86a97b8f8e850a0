//! String key-value persistence for the last viewed city.
//!
//! Both operations are best-effort: failures are logged and swallowed, so a
//! broken store only means the next launch starts from the fallback city.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::{
    collections::{BTreeMap, HashMap},
    fmt::Debug,
    path::{Path, PathBuf},
    sync::Mutex,
};
use tracing::warn;

use crate::config::project_dirs;

/// Key under which the last successfully displayed city is stored.
pub const CITY_KEY: &str = "city";

#[async_trait]
pub trait KeyValueStore: Send + Sync + Debug {
    async fn get_data(&self, key: &str) -> Option<String>;

    async fn store_data(&self, key: &str, value: &str);
}

/// Store backed by a flat TOML table on disk.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    write_lock: tokio::sync::Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), write_lock: tokio::sync::Mutex::new(()) }
    }

    /// Store in the platform data directory.
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(project_dirs()?.data_dir().join("storage.toml")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_table(&self) -> Result<BTreeMap<String, String>> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("Failed to read store: {}", self.path.display()));
            }
        };

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse store: {}", self.path.display()))
    }

    async fn write_entry(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let mut table = self.read_table().await?;
        table.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create store directory: {}", parent.display())
            })?;
        }

        // Replace atomically: write a sibling file, then rename over the store.
        let toml = toml::to_string(&table).context("Failed to serialize store to TOML")?;
        let tmp = self.path.with_extension("toml.tmp");
        tokio::fs::write(&tmp, toml)
            .await
            .with_context(|| format!("Failed to write store: {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("Failed to replace store: {}", self.path.display()))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get_data(&self, key: &str) -> Option<String> {
        match self.read_table().await {
            Ok(mut table) => table.remove(key),
            Err(err) => {
                warn!(key, error = %format!("{err:#}"), "failed to read stored value");
                None
            }
        }
    }

    async fn store_data(&self, key: &str, value: &str) {
        if let Err(err) = self.write_entry(key, value).await {
            warn!(key, error = %format!("{err:#}"), "failed to store value");
        }
    }
}

/// In-memory store; nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::default();
        store.insert(key, value);
        store
    }

    fn insert(&self, key: &str, value: &str) {
        let mut entries = self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.insert(key.to_string(), value.to_string());
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get_data(&self, key: &str) -> Option<String> {
        let entries = self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.get(key).cloned()
    }

    async fn store_data(&self, key: &str, value: &str) {
        self.insert(key, value);
    }
}
