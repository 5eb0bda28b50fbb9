//! Repository trait definitions (Ports)
//!
//! These traits define the storage interface for the domain.
//! Lookups return `Ok(None)` on a miss; only storage failures are errors.

use crate::error::StoreError;
use async_trait::async_trait;
use grocery_domain::{
    Department, DepartmentId, GroceryList, GroceryListId, Product, ProductId, Store, StoreId,
};

/// Repository for Department entities
#[async_trait]
pub trait DepartmentRepository: Send + Sync {
    /// All departments in id order
    async fn find_all(&self) -> Result<Vec<Department>, StoreError>;

    /// Find a department by ID
    async fn find_by_id(&self, id: DepartmentId) -> Result<Option<Department>, StoreError>;

    /// Find the first department with exactly this name
    async fn find_by_name(&self, name: &str) -> Result<Option<Department>, StoreError>;

    /// Create a department under a fresh id
    async fn create(&self, name: &str) -> Result<Department, StoreError>;

    /// Overwrite an existing department
    async fn update(&self, department: &Department) -> Result<(), StoreError>;
}

/// Repository for Product entities
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// All products in id order
    async fn find_all(&self) -> Result<Vec<Product>, StoreError>;

    /// Find a product by ID
    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, StoreError>;

    /// Create a product under a fresh id
    async fn create(&self, name: &str, department_id: DepartmentId)
        -> Result<Product, StoreError>;

    /// Overwrite an existing product
    async fn update(&self, product: &Product) -> Result<(), StoreError>;
}

/// Repository for Store entities
#[async_trait]
pub trait StoreRepository: Send + Sync {
    /// All stores in id order
    async fn find_all(&self) -> Result<Vec<Store>, StoreError>;

    /// Find a store by ID
    async fn find_by_id(&self, id: StoreId) -> Result<Option<Store>, StoreError>;

    /// Create a store with no departments
    async fn create(&self, name: &str) -> Result<Store, StoreError>;

    /// Overwrite an existing store, departments included
    async fn update(&self, store: &Store) -> Result<(), StoreError>;
}

/// Repository for GroceryList entities
#[async_trait]
pub trait GroceryListRepository: Send + Sync {
    /// All grocery lists in id order
    async fn find_all(&self) -> Result<Vec<GroceryList>, StoreError>;

    /// Find a grocery list by ID
    async fn find_by_id(&self, id: GroceryListId) -> Result<Option<GroceryList>, StoreError>;

    /// Find the first grocery list belonging to a store
    async fn find_by_store_id(&self, store_id: StoreId)
        -> Result<Option<GroceryList>, StoreError>;

    /// Create an empty grocery list for a store
    async fn create(&self, store_id: StoreId) -> Result<GroceryList, StoreError>;

    /// Overwrite an existing grocery list, products included
    async fn update(&self, grocery_list: &GroceryList) -> Result<(), StoreError>;
}

/// Combined repository set handed to the resolvers
pub trait Repositories: Send + Sync {
    /// Get department repository
    fn departments(&self) -> &dyn DepartmentRepository;

    /// Get product repository
    fn products(&self) -> &dyn ProductRepository;

    /// Get store repository
    fn stores(&self) -> &dyn StoreRepository;

    /// Get grocery list repository
    fn grocery_lists(&self) -> &dyn GroceryListRepository;
}
