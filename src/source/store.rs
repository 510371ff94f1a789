//! A lineage source backed by a catalog store

use super::{LineageSource, SourceError};
use crate::graph::{EntityLineage, EntityReference, LineageDepth};
use crate::storage::LineageStore;
use async_trait::async_trait;
use std::sync::Arc;

/// Serves fetches from a [`LineageStore`] on tokio's blocking pool
pub struct StoreSource<S> {
    store: Arc<S>,
}

impl<S> StoreSource<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }
}

impl<S> Clone for StoreSource<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

#[async_trait]
impl<S> LineageSource for StoreSource<S>
where
    S: LineageStore + 'static,
{
    async fn fetch_lineage(
        &self,
        entity: &EntityReference,
        depth: LineageDepth,
    ) -> Result<EntityLineage, SourceError> {
        let store = Arc::clone(&self.store);
        let entity = entity.clone();

        tokio::task::spawn_blocking(move || -> Result<EntityLineage, SourceError> {
            // Answer with the stored reference so callers see current names
            let focal = store
                .load_entity(&entity.id)?
                .ok_or_else(|| SourceError::NotFound(entity.id.to_string()))?;
            Ok(store.get_lineage(&focal, depth)?)
        })
        .await
        .map_err(|e| SourceError::Unavailable(e.to_string()))?
    }
}
