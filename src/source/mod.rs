//! Where lineage fragments come from
//!
//! A [`LineageSource`] answers "what is around this entity?" with an
//! [`EntityLineage`] fragment. Sessions only ever talk to this trait.

mod store;

use crate::graph::{EntityLineage, EntityReference, LineageDepth};
use crate::storage::StorageError;
use async_trait::async_trait;
use thiserror::Error;

pub use store::StoreSource;

/// Errors a lineage fetch can fail with
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Lineage source unavailable: {0}")]
    Unavailable(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// The fetch collaborator behind a lineage view
#[async_trait]
pub trait LineageSource: Send + Sync {
    /// Fetch the lineage around `entity`, `depth` hops each way
    async fn fetch_lineage(
        &self,
        entity: &EntityReference,
        depth: LineageDepth,
    ) -> Result<EntityLineage, SourceError>;
}
