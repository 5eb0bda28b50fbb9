//! Fault-injecting storage backend.

use async_trait::async_trait;
use grocery_domain::EntityId;
use grocery_store::{StorageBackend, StoreError};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Wraps a backend and fails reads or writes while the matching switch is on.
pub struct FailingBackend {
    inner: Arc<dyn StorageBackend>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl FailingBackend {
    /// Wrap a backend with both switches off
    pub fn new(inner: Arc<dyn StorageBackend>) -> Self {
        Self {
            inner,
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Make `read_all` and `read` fail
    pub fn set_fail_reads(&self, on: bool) {
        self.fail_reads.store(on, Ordering::SeqCst);
    }

    /// Make `write` and `allocate_id` fail
    pub fn set_fail_writes(&self, on: bool) {
        self.fail_writes.store(on, Ordering::SeqCst);
    }

    fn check(&self, switch: &AtomicBool, op: &str) -> Result<(), StoreError> {
        if switch.load(Ordering::SeqCst) {
            return Err(StoreError::Backend(format!("injected {} failure", op)));
        }
        Ok(())
    }
}

#[async_trait]
impl StorageBackend for FailingBackend {
    async fn read_all(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
        self.check(&self.fail_reads, "read")?;
        self.inner.read_all(collection).await
    }

    async fn read(&self, collection: &str, id: EntityId) -> Result<Option<Value>, StoreError> {
        self.check(&self.fail_reads, "read")?;
        self.inner.read(collection, id).await
    }

    async fn write(
        &self,
        collection: &str,
        id: EntityId,
        record: Value,
    ) -> Result<(), StoreError> {
        self.check(&self.fail_writes, "write")?;
        self.inner.write(collection, id, record).await
    }

    async fn allocate_id(&self, collection: &str) -> Result<EntityId, StoreError> {
        self.check(&self.fail_writes, "write")?;
        self.inner.allocate_id(collection).await
    }
}
