//! Domain Entities
//!
//! Each entity is a persisted record with a unique integer id inside its
//! collection. Stores embed whole departments and grocery lists embed whole
//! products; product ownership of a department is by id only.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

// =============================================================================
// Identifiers
// =============================================================================

/// Identifier shared by every collection (GraphQL `Int`)
pub type EntityId = i32;

/// Unique identifier for a Department
pub type DepartmentId = EntityId;

/// Unique identifier for a Product
pub type ProductId = EntityId;

/// Unique identifier for a Store
pub type StoreId = EntityId;

/// Unique identifier for a GroceryList
pub type GroceryListId = EntityId;

// =============================================================================
// Entity
// =============================================================================

/// A record that lives in a named collection of the storage backend.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection the records of this type are stored under
    const COLLECTION: &'static str;

    /// The record id
    fn id(&self) -> EntityId;
}

// =============================================================================
// Department
// =============================================================================

/// A store section such as "Dairy" or "Produce".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(
    feature = "graphql",
    derive(async_graphql::SimpleObject, async_graphql::InputObject),
    graphql(input_name = "DepartmentInput")
)]
pub struct Department {
    /// Unique identifier
    pub id: DepartmentId,
    /// Display name
    pub name: String,
}

impl Department {
    /// Create a department with an already allocated id
    pub fn new(id: DepartmentId, name: impl Into<String>) -> Self {
        Self { id, name: name.into() }
    }
}

impl Entity for Department {
    const COLLECTION: &'static str = "departments";

    fn id(&self) -> EntityId {
        self.id
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product, owned by a department.
///
/// The department reference is not checked: a product may point at a
/// department id that does not exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "graphql", derive(async_graphql::SimpleObject))]
pub struct Product {
    /// Unique identifier
    pub id: ProductId,
    /// Display name
    pub name: String,
    /// Owning department
    pub department_id: DepartmentId,
}

impl Product {
    /// Create a product with an already allocated id
    pub fn new(id: ProductId, name: impl Into<String>, department_id: DepartmentId) -> Self {
        Self {
            id,
            name: name.into(),
            department_id,
        }
    }
}

impl Entity for Product {
    const COLLECTION: &'static str = "products";

    fn id(&self) -> EntityId {
        self.id
    }
}

// =============================================================================
// Store
// =============================================================================

/// A physical store with an ordered list of departments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "graphql", derive(async_graphql::SimpleObject))]
pub struct Store {
    /// Unique identifier
    pub id: StoreId,
    /// Display name
    pub name: String,
    /// Departments, in insertion order, duplicates allowed
    #[serde(default)]
    pub departments: Vec<Department>,
}

impl Store {
    /// Create a store with no departments
    pub fn new(id: StoreId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            departments: Vec::new(),
        }
    }

    /// Append a department to the end of the list.
    ///
    /// No membership check: adding a department twice lists it twice.
    pub fn add_department(&mut self, department: Department) {
        self.departments.push(department);
    }

    /// Replace the department list wholesale
    pub fn replace_departments(&mut self, departments: Vec<Department>) {
        self.departments = departments;
    }
}

impl Entity for Store {
    const COLLECTION: &'static str = "stores";

    fn id(&self) -> EntityId {
        self.id
    }
}

// =============================================================================
// GroceryList
// =============================================================================

/// A shopping list for one store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "graphql", derive(async_graphql::SimpleObject))]
pub struct GroceryList {
    /// Unique identifier
    pub id: GroceryListId,
    /// Store this list is for
    pub store_id: StoreId,
    /// Products, in insertion order, duplicates allowed
    #[serde(default)]
    pub products: Vec<Product>,
}

impl GroceryList {
    /// Create an empty list for a store
    pub fn new(id: GroceryListId, store_id: StoreId) -> Self {
        Self {
            id,
            store_id,
            products: Vec::new(),
        }
    }

    /// Append a product; duplicates are kept
    pub fn add_product(&mut self, product: Product) {
        self.products.push(product);
    }

    /// Drop every entry whose id matches, keeping the order of the rest.
    ///
    /// Returns the number of entries removed.
    pub fn remove_product(&mut self, product_id: ProductId) -> usize {
        let before = self.products.len();
        self.products.retain(|p| p.id != product_id);
        before - self.products.len()
    }
}

impl Entity for GroceryList {
    const COLLECTION: &'static str = "groceryLists";

    fn id(&self) -> EntityId {
        self.id
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_add_department_keeps_duplicates() {
        let mut store = Store::new(1, "Corner Market");
        let dairy = Department::new(7, "Dairy");

        store.add_department(dairy.clone());
        store.add_department(dairy.clone());

        assert_eq!(store.departments, vec![dairy.clone(), dairy]);
    }

    #[test]
    fn test_store_replace_departments() {
        let mut store = Store::new(1, "Corner Market");
        store.add_department(Department::new(1, "Bakery"));

        let replacement = vec![Department::new(2, "Produce"), Department::new(3, "Frozen")];
        store.replace_departments(replacement.clone());

        assert_eq!(store.departments, replacement);
    }

    #[test]
    fn test_grocery_list_remove_product_removes_all_matches() {
        let milk = Product::new(1, "Milk", 10);
        let bread = Product::new(2, "Bread", 11);
        let mut list = GroceryList::new(1, 1);
        list.add_product(milk.clone());
        list.add_product(bread.clone());
        list.add_product(milk.clone());

        let removed = list.remove_product(milk.id);

        assert_eq!(removed, 2);
        assert_eq!(list.products, vec![bread]);
    }

    #[test]
    fn test_grocery_list_remove_product_is_idempotent() {
        let mut list = GroceryList::new(1, 1);
        list.add_product(Product::new(1, "Milk", 10));
        list.add_product(Product::new(2, "Bread", 11));

        list.remove_product(1);
        let once = list.products.clone();
        let removed_again = list.remove_product(1);

        assert_eq!(removed_again, 0);
        assert_eq!(list.products, once);
    }

    #[test]
    fn test_serialization_uses_camel_case() {
        let product = Product::new(3, "Milk", 9);
        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json, serde_json::json!({"id": 3, "name": "Milk", "departmentId": 9}));

        let list: GroceryList =
            serde_json::from_value(serde_json::json!({"id": 5, "storeId": 42})).unwrap();
        assert_eq!(list.store_id, 42);
        assert!(list.products.is_empty());
    }

    #[test]
    fn test_collection_names() {
        assert_eq!(Department::COLLECTION, "departments");
        assert_eq!(Product::COLLECTION, "products");
        assert_eq!(Store::COLLECTION, "stores");
        assert_eq!(GroceryList::COLLECTION, "groceryLists");
    }
}
