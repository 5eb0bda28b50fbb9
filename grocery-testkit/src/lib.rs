//! Test helpers for grocery storage-backed tests.
//!
//! Provides a seeded catalog fixture and a backend wrapper that injects
//! storage failures on demand.

mod failing;
mod seed;

pub use failing::FailingBackend;
pub use seed::{sample_document, seed_catalog, Catalog};
