//! Storage backend port
//!
//! The backend is a key-based record store: named collections of JSON
//! records, each keyed by its integer `id`. Repositories translate between
//! these records and domain entities, so a backend never knows about
//! departments or stores.

use crate::error::StoreError;
use async_trait::async_trait;
use grocery_domain::EntityId;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// On-disk layout: collection name to records in id order.
pub type Document = BTreeMap<String, Vec<Value>>;

/// Key-based record store shared by all repositories
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Read every record of a collection in ascending id order
    async fn read_all(&self, collection: &str) -> Result<Vec<Value>, StoreError>;

    /// Read one record by id
    async fn read(&self, collection: &str, id: EntityId) -> Result<Option<Value>, StoreError>;

    /// Write a whole record, replacing any record with the same id
    async fn write(&self, collection: &str, id: EntityId, record: Value)
        -> Result<(), StoreError>;

    /// Reserve a fresh id, greater than any id seen in the collection
    async fn allocate_id(&self, collection: &str) -> Result<EntityId, StoreError>;
}

/// Load a document from disk, `None` if the file does not exist.
pub async fn load_document(path: &Path) -> Result<Option<Document>, StoreError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let document = serde_json::from_slice(&bytes).map_err(|e| {
        StoreError::Deserialization(format!("{}: {}", path.display(), e))
    })?;
    Ok(Some(document))
}

// =============================================================================
// Tables
// =============================================================================

/// In-memory tables backing both the memory and the file store.
#[derive(Debug, Default)]
pub(crate) struct Tables {
    collections: HashMap<String, BTreeMap<EntityId, Value>>,
    /// Highest id handed out or seen, per collection
    sequences: HashMap<String, EntityId>,
}

impl Tables {
    pub(crate) fn from_document(document: Document) -> Result<Self, StoreError> {
        let mut tables = Self::default();
        for (collection, records) in document {
            // Keep empty collections so they survive a round trip to disk.
            tables.collections.entry(collection.clone()).or_default();
            for record in records {
                let id = record_id(&collection, &record)?;
                tables.write(&collection, id, record);
            }
        }
        Ok(tables)
    }

    pub(crate) fn to_document(&self) -> Document {
        self.collections
            .iter()
            .map(|(name, records)| (name.clone(), records.values().cloned().collect()))
            .collect()
    }

    pub(crate) fn read_all(&self, collection: &str) -> Vec<Value> {
        self.collections
            .get(collection)
            .map(|records| records.values().cloned().collect())
            .unwrap_or_default()
    }

    pub(crate) fn read(&self, collection: &str, id: EntityId) -> Option<Value> {
        self.collections.get(collection).and_then(|records| records.get(&id)).cloned()
    }

    pub(crate) fn write(&mut self, collection: &str, id: EntityId, record: Value) {
        self.collections.entry(collection.to_string()).or_default().insert(id, record);

        let seq = self.sequences.entry(collection.to_string()).or_insert(0);
        if id > *seq {
            *seq = id;
        }
    }

    pub(crate) fn allocate_id(&mut self, collection: &str) -> Result<EntityId, StoreError> {
        let seq = self.sequences.entry(collection.to_string()).or_insert(0);
        let next = seq.checked_add(1).ok_or_else(|| {
            StoreError::Backend(format!("id space exhausted for {}", collection))
        })?;
        *seq = next;
        Ok(next)
    }

    pub(crate) fn len(&self, collection: &str) -> usize {
        self.collections.get(collection).map_or(0, BTreeMap::len)
    }

    pub(crate) fn clear(&mut self) {
        self.collections.clear();
        self.sequences.clear();
    }
}

fn record_id(collection: &str, record: &Value) -> Result<EntityId, StoreError> {
    record
        .get("id")
        .and_then(Value::as_i64)
        .and_then(|id| EntityId::try_from(id).ok())
        .ok_or_else(|| {
            StoreError::Deserialization(format!(
                "record in {} has no integer id: {}",
                collection, record
            ))
        })
}

// =============================================================================
// Tests
// =============================================================================
