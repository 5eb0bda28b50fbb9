//! Resolver map.
//!
//! One method per API operation. Reads delegate straight to a repository.
//! Composed operations run their lookups concurrently, mutate the loaded
//! entity and write it back.
//!
//! # Failure policy
//!
//! Composed operations are lenient: any storage error or missing entity is
//! logged and the operation resolves to `None`, which the API renders as
//! `null` with no GraphQL error. Plain reads return their storage errors.

use std::sync::Arc;

use tracing::{debug, error, info};

use grocery_domain::{
    Department, DepartmentId, GroceryList, GroceryListId, Product, ProductId, Store, StoreId,
};
use grocery_store::{Repositories, StoreError};

/// Resolver functions over an injected repository set.
pub struct Resolvers {
    repos: Arc<dyn Repositories>,
}

impl Resolvers {
    /// Create resolvers over the given repositories.
    pub fn new(repos: Arc<dyn Repositories>) -> Self {
        Self { repos }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// All departments.
    pub async fn departments(&self) -> Result<Vec<Department>, StoreError> {
        info!("Processing request: departments");
        self.repos.departments().find_all().await
    }

    /// All products.
    pub async fn products(&self) -> Result<Vec<Product>, StoreError> {
        info!("Processing request: products");
        self.repos.products().find_all().await
    }

    /// All stores.
    pub async fn stores(&self) -> Result<Vec<Store>, StoreError> {
        info!("Processing request: stores");
        self.repos.stores().find_all().await
    }

    /// All grocery lists.
    pub async fn grocery_lists(&self) -> Result<Vec<GroceryList>, StoreError> {
        info!("Processing request: groceryLists");
        self.repos.grocery_lists().find_all().await
    }

    /// The grocery list of a store, `None` if the store has none.
    pub async fn grocery_list(&self, store_id: StoreId) -> Result<Option<GroceryList>, StoreError> {
        info!(store_id, "Processing request: groceryList");
        self.repos.grocery_lists().find_by_store_id(store_id).await
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Attach a department to a store by name, creating the department if no
    /// department has that name yet.
    ///
    /// The department is appended even if the store already lists it.
    pub async fn add_department_to_store(
        &self,
        department_name: &str,
        store_id: StoreId,
    ) -> Option<Store> {
        info!(department_name, store_id, "Processing request: addDepartmentToStore");

        let result = async {
            let (store, department) = tokio::try_join!(
                self.repos.stores().find_by_id(store_id),
                self.find_or_create_department(department_name),
            )?;
            let mut store = store.ok_or_else(|| StoreError::not_found("store", store_id))?;

            debug!(store = %store.name, department_id = department.id, "addDepartmentToStore");
            store.add_department(department);
            self.repos.stores().update(&store).await?;
            Ok::<_, StoreError>(store)
        }
        .await;

        lenient("addDepartmentToStore", result)
    }

    /// Replace a store's department list with `departments`.
    pub async fn update_departments_for_store(
        &self,
        departments: Vec<Department>,
        store_id: StoreId,
    ) -> Option<Store> {
        info!(store_id, count = departments.len(), "Processing request: updateDepartmentsForStore");

        let result = async {
            let mut store = self
                .repos
                .stores()
                .find_by_id(store_id)
                .await?
                .ok_or_else(|| StoreError::not_found("store", store_id))?;

            store.replace_departments(departments);
            self.repos.stores().update(&store).await?;
            Ok::<_, StoreError>(store)
        }
        .await;

        lenient("updateDepartmentsForStore", result)
    }

    /// Create a product. The department id is stored as given.
    pub async fn add_product(&self, name: &str, department_id: DepartmentId) -> Option<Product> {
        info!(name, department_id, "Processing request: addProduct");

        let result = self.repos.products().create(name, department_id).await;
        if let Ok(product) = &result {
            debug!(product_id = product.id, "addProduct created product");
        }

        lenient("addProduct", result)
    }

    /// Append a product to a grocery list; duplicates are kept.
    pub async fn add_product_to_grocery_list(
        &self,
        product_id: ProductId,
        grocery_list_id: GroceryListId,
    ) -> Option<GroceryList> {
        info!(product_id, grocery_list_id, "Processing request: addProductToGroceryList");

        let result = async {
            let (mut grocery_list, product) =
                self.load_list_and_product(grocery_list_id, product_id).await?;

            grocery_list.add_product(product);
            self.repos.grocery_lists().update(&grocery_list).await?;
            Ok::<_, StoreError>(grocery_list)
        }
        .await;

        lenient("addProductToGroceryList", result)
    }

    /// Remove every occurrence of a product from a grocery list.
    pub async fn remove_product_from_grocery_list(
        &self,
        product_id: ProductId,
        grocery_list_id: GroceryListId,
    ) -> Option<GroceryList> {
        info!(product_id, grocery_list_id, "Processing request: removeProductFromGroceryList");

        let result = async {
            let (mut grocery_list, product) =
                self.load_list_and_product(grocery_list_id, product_id).await?;

            let removed = grocery_list.remove_product(product.id);
            debug!(grocery_list_id, removed, "removeProductFromGroceryList");
            self.repos.grocery_lists().update(&grocery_list).await?;
            Ok::<_, StoreError>(grocery_list)
        }
        .await;

        lenient("removeProductFromGroceryList", result)
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    async fn find_or_create_department(&self, name: &str) -> Result<Department, StoreError> {
        match self.repos.departments().find_by_name(name).await? {
            Some(department) => {
                debug!(department_id = department.id, "Found existing department");
                Ok(department)
            },
            None => {
                debug!(name, "Creating new department");
                self.repos.departments().create(name).await
            },
        }
    }

    /// Both lookups run concurrently; both entities must exist.
    async fn load_list_and_product(
        &self,
        grocery_list_id: GroceryListId,
        product_id: ProductId,
    ) -> Result<(GroceryList, Product), StoreError> {
        let (grocery_list, product) = tokio::try_join!(
            self.repos.grocery_lists().find_by_id(grocery_list_id),
            self.repos.products().find_by_id(product_id),
        )?;

        let grocery_list =
            grocery_list.ok_or_else(|| StoreError::not_found("grocery list", grocery_list_id))?;
        let product = product.ok_or_else(|| StoreError::not_found("product", product_id))?;
        Ok((grocery_list, product))
    }
}

/// Log a failed composed operation and turn it into `None`.
fn lenient<T>(operation: &'static str, result: Result<T, StoreError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            error!(operation, error = %e, "Operation failed, resolving to null");
            None
        },
    }
}

// =============================================================================
// Tests
// =============================================================================
