//! JSON file storage backend
//!
//! Keeps the whole document in memory and rewrites the file after every
//! write. The rewrite goes to a sibling temp file first and is renamed over
//! the data file, so a crash mid-write leaves the previous version intact.

use crate::backend::{load_document, StorageBackend, Tables};
use crate::error::StoreError;
use async_trait::async_trait;
use grocery_domain::EntityId;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Record store persisted as a single JSON document
pub struct JsonFileBackend {
    path: PathBuf,
    tables: Mutex<Tables>,
}

impl JsonFileBackend {
    /// Open the document at `path`.
    ///
    /// A missing file opens an empty store; the file is created on the first
    /// write.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let tables = match load_document(&path).await? {
            Some(document) => Tables::from_document(document)?,
            None => {
                info!(path = %path.display(), "Data file not found, starting empty");
                Tables::default()
            },
        };

        Ok(Self {
            path,
            tables: Mutex::new(tables),
        })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn flush(&self, tables: &Tables) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(&tables.to_document())
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        debug!(path = %self.path.display(), bytes = bytes.len(), "Flushed data file");
        Ok(())
    }
}

#[async_trait]
impl StorageBackend for JsonFileBackend {
    async fn read_all(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
        Ok(self.tables.lock().await.read_all(collection))
    }

    async fn read(&self, collection: &str, id: EntityId) -> Result<Option<Value>, StoreError> {
        Ok(self.tables.lock().await.read(collection, id))
    }

    async fn write(
        &self,
        collection: &str,
        id: EntityId,
        record: Value,
    ) -> Result<(), StoreError> {
        // Lock is held across the flush so file writes never interleave.
        let mut tables = self.tables.lock().await;
        tables.write(collection, id, record);
        self.flush(&tables).await
    }

    async fn allocate_id(&self, collection: &str) -> Result<EntityId, StoreError> {
        self.tables.lock().await.allocate_id(collection)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_open_missing_file_then_write_creates_it() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("grocery.json");

        let backend = JsonFileBackend::open(&path).await.unwrap();
        assert!(!path.exists());

        backend.write("departments", 1, json!({"id": 1, "name": "Dairy"})).await.unwrap();
        assert!(path.exists());

        let text = std::fs::read_to_string(&path).unwrap();
        let on_disk: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(on_disk, json!({"departments": [{"id": 1, "name": "Dairy"}]}));
    }

    #[tokio::test]
    async fn test_reopen_sees_previous_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grocery.json");

        {
            let backend = JsonFileBackend::open(&path).await.unwrap();
            let id = backend.allocate_id("stores").await.unwrap();
            backend.write("stores", id, json!({"id": id, "name": "Main St"})).await.unwrap();
        }

        let reopened = JsonFileBackend::open(&path).await.unwrap();
        let stores = reopened.read_all("stores").await.unwrap();
        assert_eq!(stores, vec![json!({"id": 1, "name": "Main St"})]);
        assert_eq!(reopened.allocate_id("stores").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_malformed_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grocery.json");
        std::fs::write(&path, "not json").unwrap();

        let result = JsonFileBackend::open(&path).await;
        assert!(matches!(result, Err(StoreError::Deserialization(_))));
    }

    #[tokio::test]
    async fn test_no_temp_file_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grocery.json");

        let backend = JsonFileBackend::open(&path).await.unwrap();
        backend.write("products", 1, json!({"id": 1})).await.unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }
}
