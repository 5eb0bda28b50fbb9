//! Grocery Storage Layer
//!
//! Provides persistence for departments, products, stores and grocery lists.
//!
//! # Architecture
//!
//! - **Storage backend**: key-based record store (ports + in-memory and JSON file adapters)
//! - **Repository traits**: typed find/create/update interface per entity
//! - **Backend repositories**: one implementation of every repository over any backend
//!
//! # Usage
//!
//! ```rust
//! use grocery_store::{BackendRepositories, MemoryBackend, Repositories};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let repos = BackendRepositories::new(Arc::new(MemoryBackend::new()));
//!
//!     let dairy = repos.departments().create("Dairy").await.unwrap();
//!     let milk = repos.products().create("Milk", dairy.id).await.unwrap();
//!
//!     assert_eq!(milk.department_id, dairy.id);
//! }
//! ```

#![warn(clippy::all)]

// Modules
mod backend;
mod error;
mod file;
mod memory;
mod repositories;
mod repository;

// Re-exports
pub use backend::{load_document, Document, StorageBackend};
pub use error::StoreError;
pub use file::JsonFileBackend;
pub use memory::MemoryBackend;
pub use repositories::BackendRepositories;
pub use repository::{
    DepartmentRepository, GroceryListRepository, ProductRepository, Repositories,
    StoreRepository,
};
