//! Checkpoint persistence.
//!
//! The engine treats the checkpoint as a single mutable cell behind the
//! [`CheckpointStore`] contract: read at plan time, written after each
//! successful literal tribe, flushed once per invocation. Two stores are
//! bundled: [`MemoryStore`] for tests and embedders with their own
//! persistence, [`JsonFileStore`] for a small durable document on disk.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Error type checkpoint stores may return.
pub type StoreError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Key under which the engine persists the last applied literal target.
pub const CHECKPOINT_KEY: &str = "caravan.checkpoint";

/// A string-value store holding the migration checkpoint.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store `value` under `key`, overwriting any previous value.
    async fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Synchronize pending writes with the backing medium.
    async fn flush(&mut self) -> Result<(), StoreError>;
}

/// Volatile in-memory store; `flush` is a no-op.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CheckpointStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.get(key).cloned())
    }

    async fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// On-disk document format for [`JsonFileStore`].
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreDocument {
    #[serde(default)]
    values: HashMap<String, String>,
}

/// Store persisting its values as a JSON document.
///
/// Writes are buffered in memory; `flush` writes the whole document
/// atomically (temp file, then rename), so a crash mid-flush leaves the
/// previous document intact.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    document: StoreDocument,
    dirty: bool,
}

impl JsonFileStore {
    /// Open a store at `path`, loading the existing document if present.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let document = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no checkpoint document, starting empty");
                StoreDocument::default()
            }
            Err(err) => return Err(err.into()),
        };

        Ok(Self {
            path,
            document,
            dirty: false,
        })
    }
}

#[async_trait]
impl CheckpointStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.document.values.get(key).cloned())
    }

    async fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.document.values.insert(key.to_string(), value.to_string());
        self.dirty = true;
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), StoreError> {
        if !self.dirty {
            return Ok(());
        }

        let contents = serde_json::to_string_pretty(&self.document)?;
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, contents).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        self.dirty = false;
        Ok(())
    }
}
