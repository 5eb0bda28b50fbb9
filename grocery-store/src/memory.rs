//! In-memory storage backend
//!
//! Used for testing and development without a data file.
//! Thread-safe using an async RwLock for concurrent access.

use crate::backend::{load_document, Document, StorageBackend, Tables};
use crate::error::StoreError;
use async_trait::async_trait;
use grocery_domain::EntityId;
use serde_json::Value;
use std::path::Path;
use tokio::sync::RwLock;
use tracing::debug;

/// In-memory record store
pub struct MemoryBackend {
    tables: RwLock<Tables>,
}

impl MemoryBackend {
    /// Create a new empty in-memory store
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
        }
    }

    /// Create a store pre-populated with the records of a document
    pub fn from_document(document: Document) -> Result<Self, StoreError> {
        Ok(Self {
            tables: RwLock::new(Tables::from_document(document)?),
        })
    }

    /// Seed from a JSON document on disk; a missing file gives an empty store.
    ///
    /// The file is only read. Writes stay in memory.
    pub async fn seeded_from(path: &Path) -> Result<Self, StoreError> {
        match load_document(path).await? {
            Some(document) => {
                debug!(path = %path.display(), "Seeding memory store");
                Self::from_document(document)
            },
            None => Ok(Self::new()),
        }
    }

    /// Get the number of records in a collection
    pub async fn record_count(&self, collection: &str) -> usize {
        self.tables.read().await.len(collection)
    }

    /// Snapshot every collection
    pub async fn snapshot(&self) -> Document {
        self.tables.read().await.to_document()
    }

    /// Clear all data (useful for test setup)
    pub async fn clear(&self) {
        self.tables.write().await.clear();
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    async fn read_all(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
        Ok(self.tables.read().await.read_all(collection))
    }

    async fn read(&self, collection: &str, id: EntityId) -> Result<Option<Value>, StoreError> {
        Ok(self.tables.read().await.read(collection, id))
    }

    async fn write(
        &self,
        collection: &str,
        id: EntityId,
        record: Value,
    ) -> Result<(), StoreError> {
        self.tables.write().await.write(collection, id, record);
        Ok(())
    }

    async fn allocate_id(&self, collection: &str) -> Result<EntityId, StoreError> {
        self.tables.write().await.allocate_id(collection)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_write_and_read() {
        let backend = MemoryBackend::new();
        backend.write("departments", 1, json!({"id": 1, "name": "Dairy"})).await.unwrap();

        let found = backend.read("departments", 1).await.unwrap();
        assert_eq!(found, Some(json!({"id": 1, "name": "Dairy"})));
        assert!(backend.read("departments", 2).await.unwrap().is_none());
        assert!(backend.read("stores", 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_write_overwrites_whole_record() {
        let backend = MemoryBackend::new();
        let old = json!({"id": 1, "name": "Old", "departments": []});
        backend.write("stores", 1, old).await.unwrap();
        backend.write("stores", 1, json!({"id": 1, "name": "New"})).await.unwrap();

        assert_eq!(backend.read("stores", 1).await.unwrap(), Some(json!({"id": 1, "name": "New"})));
        assert_eq!(backend.record_count("stores").await, 1);
    }

    #[tokio::test]
    async fn test_concurrent_allocations_are_unique() {
        let backend = Arc::new(MemoryBackend::new());

        let mut handles = Vec::new();
        for _ in 0..32 {
            let backend = backend.clone();
            handles.push(tokio::spawn(async move { backend.allocate_id("products").await }));
        }

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap().unwrap());
        }
        ids.sort_unstable();
        ids.dedup();

        assert_eq!(ids.len(), 32);
        assert_eq!(ids.first(), Some(&1));
        assert_eq!(ids.last(), Some(&32));
    }

    #[tokio::test]
    async fn test_seeded_from_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let backend = MemoryBackend::seeded_from(&dir.path().join("none.json")).await.unwrap();

        assert!(backend.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn test_seeded_from_file_does_not_write_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seed.json");
        let seed = r#"{"departments": [{"id": 1, "name": "Dairy"}]}"#;
        std::fs::write(&path, seed).unwrap();

        let backend = MemoryBackend::seeded_from(&path).await.unwrap();
        backend.write("departments", 2, json!({"id": 2, "name": "Bakery"})).await.unwrap();

        assert_eq!(backend.record_count("departments").await, 2);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), seed);
    }

    #[tokio::test]
    async fn test_clear() {
        let backend = MemoryBackend::new();
        backend.write("products", 5, json!({"id": 5})).await.unwrap();
        backend.clear().await;

        assert_eq!(backend.record_count("products").await, 0);
        assert_eq!(backend.allocate_id("products").await.unwrap(), 1);
    }
}
