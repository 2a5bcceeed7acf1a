//! Form store backends
//!
//! Both backends keep the serialized JSON snapshot, so a value that cannot be
//! parsed back surfaces as [`StoreError::Malformed`] on load.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::{StoreBackend, StoreSettings};
use crate::domain::error::StoreError;
use crate::domain::form::FormConfig;
use crate::domain::FormStorePort;

fn parse(id: &str, raw: &str) -> Result<FormConfig, StoreError> {
    serde_json::from_str(raw).map_err(|e| StoreError::Malformed {
        id: id.to_string(),
        reason: e.to_string(),
    })
}

fn require_id(config: &FormConfig) -> Result<&str, StoreError> {
    if config.id.trim().is_empty() {
        Err(StoreError::InvalidId(config.id.clone()))
    } else {
        Ok(&config.id)
    }
}

// ============================================================================
// In-memory
// ============================================================================

#[derive(Clone, Default)]
pub struct InMemoryFormStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryFormStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a raw value under `id` without serializing a configuration
    pub async fn insert_raw(&self, id: &str, raw: &str) {
        let mut entries = self.entries.write().await;
        entries.insert(id.to_string(), raw.to_string());
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl FormStorePort for InMemoryFormStore {
    async fn save(&self, config: &FormConfig) -> Result<String, StoreError> {
        let id = require_id(config)?;
        let raw = serde_json::to_string(config)?;
        let mut entries = self.entries.write().await;
        entries.insert(id.to_string(), raw);
        Ok(id.to_string())
    }

    async fn load(&self, id: &str) -> Result<Option<FormConfig>, StoreError> {
        let entries = self.entries.read().await;
        entries.get(id).map(|raw| parse(id, raw)).transpose()
    }
}

// ============================================================================
// File-backed
// ============================================================================

/// One `<id>.json` file per configuration under a root directory
pub struct FileFormStore {
    root: PathBuf,
}

impl FileFormStore {
    pub async fn new(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, id: &str) -> Result<PathBuf, StoreError> {
        let valid = !id.is_empty()
            && id.len() <= 128
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StoreError::InvalidId(id.to_string()));
        }
        Ok(self.root.join(format!("{}.json", id)))
    }
}

#[async_trait]
impl FormStorePort for FileFormStore {
    async fn save(&self, config: &FormConfig) -> Result<String, StoreError> {
        let id = require_id(config)?;
        let path = self.path_for(id)?;
        let raw = serde_json::to_vec_pretty(config)?;

        // Readers see either the old or the new snapshot, never a partial write
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &raw).await?;
        tokio::fs::rename(&tmp, &path).await?;

        tracing::debug!("Wrote form {} to {}", id, path.display());
        Ok(id.to_string())
    }

    async fn load(&self, id: &str) -> Result<Option<FormConfig>, StoreError> {
        let path = self.path_for(id)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(raw) => parse(id, &raw).map(Some),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Build the store selected in settings
pub async fn build_store(settings: &StoreSettings) -> Result<Arc<dyn FormStorePort>, StoreError> {
    match settings.backend {
        StoreBackend::Memory => {
            tracing::info!("Using in-memory form store");
            Ok(Arc::new(InMemoryFormStore::new()))
        }
        StoreBackend::File => {
            let store = FileFormStore::new(&settings.path).await?;
            tracing::info!("Using file form store at {}", store.root().display());
            Ok(Arc::new(store))
        }
    }
}
