//! Seeding helpers.

use anyhow::{Context, Result};
use grocery_domain::{Department, GroceryList, Product, Store};
use grocery_store::{Document, Repositories};
use serde_json::json;

/// Records created by [`seed_catalog`].
#[derive(Debug, Clone)]
pub struct Catalog {
    pub dairy: Department,
    pub produce: Department,
    pub milk: Product,
    pub apples: Product,
    /// Store stocking dairy only
    pub store: Store,
    /// Second store with no departments and no grocery list
    pub empty_store: Store,
    /// Grocery list of `store`, holding milk
    pub grocery_list: GroceryList,
}

/// Seed a small catalog through the repositories.
///
/// Goes through `create`/`update` so the records get real allocated ids.
pub async fn seed_catalog(repos: &dyn Repositories) -> Result<Catalog> {
    let dairy = repos.departments().create("Dairy").await?;
    let produce = repos.departments().create("Produce").await?;

    let milk = repos.products().create("Milk", dairy.id).await?;
    let apples = repos.products().create("Apples", produce.id).await?;

    let mut store = repos.stores().create("Corner Market").await?;
    store.add_department(dairy.clone());
    repos.stores().update(&store).await?;
    let empty_store = repos.stores().create("Empty Lot").await?;

    let mut grocery_list = repos.grocery_lists().create(store.id).await?;
    grocery_list.add_product(milk.clone());
    repos.grocery_lists().update(&grocery_list).await?;

    // Read back to make sure what the caller holds matches storage.
    let store = repos
        .stores()
        .find_by_id(store.id)
        .await?
        .context("seeded store missing")?;

    Ok(Catalog {
        dairy,
        produce,
        milk,
        apples,
        store,
        empty_store,
        grocery_list,
    })
}

/// A document in the on-disk format, for backends seeded without repositories.
pub fn sample_document() -> Document {
    let mut document = Document::new();
    document.insert(
        "departments".to_string(),
        vec![json!({"id": 1, "name": "Dairy"}), json!({"id": 2, "name": "Produce"})],
    );
    document.insert(
        "products".to_string(),
        vec![
            json!({"id": 1, "name": "Milk", "departmentId": 1}),
            json!({"id": 2, "name": "Apples", "departmentId": 2}),
        ],
    );
    document.insert(
        "stores".to_string(),
        vec![json!({
            "id": 1,
            "name": "Corner Market",
            "departments": [{"id": 1, "name": "Dairy"}]
        })],
    );
    document.insert(
        "groceryLists".to_string(),
        vec![json!({
            "id": 1,
            "storeId": 1,
            "products": [{"id": 1, "name": "Milk", "departmentId": 1}]
        })],
    );
    document
}

#[cfg(test)]
mod tests {
    use super::*;
    use grocery_store::{BackendRepositories, MemoryBackend};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_seed_catalog() {
        let repos = BackendRepositories::new(Arc::new(MemoryBackend::new()));
        let catalog = seed_catalog(&repos).await.unwrap();

        assert_eq!(catalog.store.departments, vec![catalog.dairy.clone()]);
        assert_eq!(catalog.grocery_list.products, vec![catalog.milk.clone()]);
        assert_eq!(catalog.grocery_list.store_id, catalog.store.id);
        assert!(catalog.empty_store.departments.is_empty());
    }

    #[tokio::test]
    async fn test_sample_document_loads() {
        let backend = MemoryBackend::from_document(sample_document()).unwrap();
        assert_eq!(backend.record_count("departments").await, 2);
        assert_eq!(backend.record_count("groceryLists").await, 1);
    }
}
