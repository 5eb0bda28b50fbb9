//! Grocery Daemon Library
//!
//! GraphQL API over departments, products, stores and grocery lists.
//!
//! # Architecture
//!
//! ```text
//! HTTP (axum) → GraphQL schema → Resolvers → Repositories → Storage backend
//! ```
//!
//! # Components
//!
//! - **Daemon**: Builds the object graph once and serves it
//! - **Resolvers**: One function per API operation, composing repository calls
//! - **Schema**: GraphQL query and mutation roots
//! - **API**: `/graphql` (GET + POST + GraphiQL) and `/health`
//! - **Config**: Environment-based configuration
//!
//! # Example
//!
//! ```rust,ignore
//! use groceryd::{Config, Daemon};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::from_env().expect("Failed to load config");
//!     let daemon = Daemon::from_config(config).await.expect("Failed to open storage");
//!     daemon.run().await.expect("Daemon error");
//! }
//! ```

#![warn(clippy::all)]

pub mod api;
pub mod config;
pub mod daemon;
pub mod error;
pub mod resolvers;
pub mod schema;

// Re-exports for convenience
pub use api::{create_router, ApiState};
pub use config::{ApiConfig, Config, Environment, StorageConfig};
pub use daemon::Daemon;
pub use error::{DaemonError, DaemonResult};
pub use resolvers::Resolvers;
pub use schema::{build_schema, GrocerySchema};
