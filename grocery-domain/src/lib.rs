//! Grocery Domain Layer
//!
//! Pure entity types with zero I/O dependencies.
//! Departments, products, stores and grocery lists, plus the
//! in-memory mutations the resolvers apply before persisting.

#![warn(missing_docs)]
#![warn(clippy::all)]

// Public modules
pub mod entities;

// Re-export commonly used types
pub use entities::{
    Department, DepartmentId, Entity, EntityId, GroceryList, GroceryListId, Product, ProductId,
    Store, StoreId,
};
