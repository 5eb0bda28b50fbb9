//! Repository implementation over any storage backend
//!
//! One `BackendRepositories` value implements all four repository traits by
//! mapping each entity type onto its backend collection.

use crate::backend::StorageBackend;
use crate::error::StoreError;
use crate::repository::{
    DepartmentRepository, GroceryListRepository, ProductRepository, Repositories,
    StoreRepository,
};
use async_trait::async_trait;
use grocery_domain::{
    Department, DepartmentId, Entity, EntityId, GroceryList, GroceryListId, Product, ProductId,
    Store, StoreId,
};
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::debug;

/// Repositories backed by a shared storage backend
#[derive(Clone)]
pub struct BackendRepositories {
    backend: Arc<dyn StorageBackend>,
}

impl BackendRepositories {
    /// Wrap a backend
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// Get the underlying backend
    pub fn backend(&self) -> &Arc<dyn StorageBackend> {
        &self.backend
    }

    fn collection<T: Entity>(&self) -> Collection<'_, T> {
        Collection {
            backend: self.backend.as_ref(),
            _entity: PhantomData,
        }
    }
}

// =============================================================================
// Typed collection view
// =============================================================================

struct Collection<'a, T> {
    backend: &'a dyn StorageBackend,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> Collection<'_, T> {
    async fn all(&self) -> Result<Vec<T>, StoreError> {
        self.backend
            .read_all(T::COLLECTION)
            .await?
            .into_iter()
            .map(decode::<T>)
            .collect()
    }

    async fn get(&self, id: EntityId) -> Result<Option<T>, StoreError> {
        self.backend.read(T::COLLECTION, id).await?.map(decode::<T>).transpose()
    }

    async fn find_first<P>(&self, predicate: P) -> Result<Option<T>, StoreError>
    where
        P: Fn(&T) -> bool + Send,
    {
        Ok(self.all().await?.into_iter().find(|entity| predicate(entity)))
    }

    async fn insert_new<F>(&self, build: F) -> Result<T, StoreError>
    where
        F: FnOnce(EntityId) -> T + Send,
    {
        let id = self.backend.allocate_id(T::COLLECTION).await?;
        let entity = build(id);
        self.backend.write(T::COLLECTION, id, encode(&entity)?).await?;

        debug!(collection = T::COLLECTION, id, "Created record");
        Ok(entity)
    }

    async fn replace(&self, entity: &T) -> Result<(), StoreError> {
        let id = entity.id();
        if self.backend.read(T::COLLECTION, id).await?.is_none() {
            return Err(StoreError::not_found(T::COLLECTION, id));
        }
        self.backend.write(T::COLLECTION, id, encode(entity)?).await
    }
}

fn decode<T: Entity>(record: Value) -> Result<T, StoreError> {
    serde_json::from_value(record)
        .map_err(|e| StoreError::Deserialization(format!("{}: {}", T::COLLECTION, e)))
}

fn encode<T: Entity>(entity: &T) -> Result<Value, StoreError> {
    serde_json::to_value(entity).map_err(|e| StoreError::Serialization(e.to_string()))
}

// =============================================================================
// Department Repository Implementation
// =============================================================================

#[async_trait]
impl DepartmentRepository for BackendRepositories {
    async fn find_all(&self) -> Result<Vec<Department>, StoreError> {
        self.collection::<Department>().all().await
    }

    async fn find_by_id(&self, id: DepartmentId) -> Result<Option<Department>, StoreError> {
        self.collection::<Department>().get(id).await
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Department>, StoreError> {
        self.collection::<Department>().find_first(|d| d.name == name).await
    }

    async fn create(&self, name: &str) -> Result<Department, StoreError> {
        self.collection().insert_new(|id| Department::new(id, name)).await
    }

    async fn update(&self, department: &Department) -> Result<(), StoreError> {
        self.collection().replace(department).await
    }
}

// =============================================================================
// Product Repository Implementation
// =============================================================================

#[async_trait]
impl ProductRepository for BackendRepositories {
    async fn find_all(&self) -> Result<Vec<Product>, StoreError> {
        self.collection::<Product>().all().await
    }

    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        self.collection::<Product>().get(id).await
    }

    async fn create(
        &self,
        name: &str,
        department_id: DepartmentId,
    ) -> Result<Product, StoreError> {
        self.collection().insert_new(|id| Product::new(id, name, department_id)).await
    }

    async fn update(&self, product: &Product) -> Result<(), StoreError> {
        self.collection().replace(product).await
    }
}

// =============================================================================
// Store Repository Implementation
// =============================================================================

#[async_trait]
impl StoreRepository for BackendRepositories {
    async fn find_all(&self) -> Result<Vec<Store>, StoreError> {
        self.collection::<Store>().all().await
    }

    async fn find_by_id(&self, id: StoreId) -> Result<Option<Store>, StoreError> {
        self.collection::<Store>().get(id).await
    }

    async fn create(&self, name: &str) -> Result<Store, StoreError> {
        self.collection().insert_new(|id| Store::new(id, name)).await
    }

    async fn update(&self, store: &Store) -> Result<(), StoreError> {
        self.collection().replace(store).await
    }
}

// =============================================================================
// GroceryList Repository Implementation
// =============================================================================

#[async_trait]
impl GroceryListRepository for BackendRepositories {
    async fn find_all(&self) -> Result<Vec<GroceryList>, StoreError> {
        self.collection::<GroceryList>().all().await
    }

    async fn find_by_id(&self, id: GroceryListId) -> Result<Option<GroceryList>, StoreError> {
        self.collection::<GroceryList>().get(id).await
    }

    async fn find_by_store_id(
        &self,
        store_id: StoreId,
    ) -> Result<Option<GroceryList>, StoreError> {
        self.collection::<GroceryList>().find_first(|g| g.store_id == store_id).await
    }

    async fn create(&self, store_id: StoreId) -> Result<GroceryList, StoreError> {
        self.collection().insert_new(|id| GroceryList::new(id, store_id)).await
    }

    async fn update(&self, grocery_list: &GroceryList) -> Result<(), StoreError> {
        self.collection().replace(grocery_list).await
    }
}

// =============================================================================
// Repositories Implementation
// =============================================================================

impl Repositories for BackendRepositories {
    fn departments(&self) -> &dyn DepartmentRepository {
        self
    }

    fn products(&self) -> &dyn ProductRepository {
        self
    }

    fn stores(&self) -> &dyn StoreRepository {
        self
    }

    fn grocery_lists(&self) -> &dyn GroceryListRepository {
        self
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryBackend;
    use serde_json::json;

    fn repositories() -> BackendRepositories {
        BackendRepositories::new(Arc::new(MemoryBackend::new()))
    }

    // Department Repository Tests
    #[tokio::test]
    async fn test_department_create_and_find() {
        let repos = repositories();

        let dairy = repos.departments().create("Dairy").await.unwrap();
        let bakery = repos.departments().create("Bakery").await.unwrap();
        assert_ne!(dairy.id, bakery.id);

        let found = repos.departments().find_by_id(dairy.id).await.unwrap();
        assert_eq!(found, Some(dairy.clone()));

        let all = repos.departments().find_all().await.unwrap();
        assert_eq!(all, vec![dairy, bakery]);
    }

    #[tokio::test]
    async fn test_department_find_by_name_is_exact() {
        let repos = repositories();
        let dairy = repos.departments().create("Dairy").await.unwrap();

        assert_eq!(repos.departments().find_by_name("Dairy").await.unwrap(), Some(dairy));
        assert!(repos.departments().find_by_name("dairy").await.unwrap().is_none());
        assert!(repos.departments().find_by_name("Produce").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_department_find_by_name_returns_lowest_id() {
        let repos = repositories();
        let first = repos.departments().create("Deli").await.unwrap();
        repos.departments().create("Deli").await.unwrap();

        let found = repos.departments().find_by_name("Deli").await.unwrap();
        assert_eq!(found.map(|d| d.id), Some(first.id));
    }

    #[tokio::test]
    async fn test_department_update() {
        let repos = repositories();
        let mut dept = repos.departments().create("Diary").await.unwrap();
        dept.name = "Dairy".to_string();

        repos.departments().update(&dept).await.unwrap();

        let found = repos.departments().find_by_id(dept.id).await.unwrap();
        assert_eq!(found.map(|d| d.name), Some("Dairy".to_string()));
    }

    // Product Repository Tests
    #[tokio::test]
    async fn test_product_create() {
        let repos = repositories();
        let product = repos.products().create("Milk", 3).await.unwrap();

        assert_eq!(product.name, "Milk");
        assert_eq!(product.department_id, 3);
        assert_eq!(repos.products().find_by_id(product.id).await.unwrap(), Some(product));
    }

    #[tokio::test]
    async fn test_product_find_by_id_miss() {
        let repos = repositories();
        assert!(repos.products().find_by_id(99).await.unwrap().is_none());
    }

    // Store Repository Tests
    #[tokio::test]
    async fn test_store_update_persists_departments() {
        let repos = repositories();
        let mut store = repos.stores().create("Main St").await.unwrap();
        let dairy = repos.departments().create("Dairy").await.unwrap();

        store.add_department(dairy.clone());
        repos.stores().update(&store).await.unwrap();

        let found = repos.stores().find_by_id(store.id).await.unwrap().unwrap();
        assert_eq!(found.departments, vec![dairy]);
    }

    #[tokio::test]
    async fn test_store_update_missing_is_not_found() {
        let repos = repositories();
        let ghost = Store::new(77, "Ghost");

        let result = repos.stores().update(&ghost).await;
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
        assert!(repos.stores().find_by_id(77).await.unwrap().is_none());
    }

    // GroceryList Repository Tests
    #[tokio::test]
    async fn test_grocery_list_find_by_store_id() {
        let repos = repositories();
        let first = repos.grocery_lists().create(1).await.unwrap();
        repos.grocery_lists().create(1).await.unwrap();
        let other = repos.grocery_lists().create(2).await.unwrap();

        let found = repos.grocery_lists().find_by_store_id(1).await.unwrap();
        assert_eq!(found.map(|g| g.id), Some(first.id));

        let found = repos.grocery_lists().find_by_store_id(2).await.unwrap();
        assert_eq!(found.map(|g| g.id), Some(other.id));

        assert!(repos.grocery_lists().find_by_store_id(42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_malformed_record_is_deserialization_error() {
        let backend = Arc::new(MemoryBackend::new());
        backend.write("products", 1, json!({"id": 1, "name": 5})).await.unwrap();
        let repos = BackendRepositories::new(backend);

        let result = repos.products().find_by_id(1).await;
        assert!(matches!(result, Err(StoreError::Deserialization(_))));
    }

    #[tokio::test]
    async fn test_records_use_camel_case_on_backend() {
        let backend = Arc::new(MemoryBackend::new());
        let repos = BackendRepositories::new(backend.clone());

        let list = repos.grocery_lists().create(9).await.unwrap();
        let raw = backend.read("groceryLists", list.id).await.unwrap().unwrap();

        assert_eq!(raw, json!({"id": list.id, "storeId": 9, "products": []}));
    }
}
