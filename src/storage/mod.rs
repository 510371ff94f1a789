//! Storage backends for the lineage catalog
//!
//! The catalog is reached through the `LineageStore` trait.
//! The primary implementation is `SqliteStore` for persistent storage.

mod sqlite;
mod traits;

pub use sqlite::SqliteStore;
pub use traits::{LineageStore, OpenStore, StorageError, StorageResult};
