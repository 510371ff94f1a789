//! Storage trait definitions

use crate::graph::{
    Edge, EntityId, EntityLineage, EntityReference, LineageDepth, LineageDetails, LineageDirection, TABLE,
};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Entity not found: {0}")]
    EntityNotFound(String),

    #[error("Invalid lineage: {0}")]
    InvalidLineage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for lineage catalog backends
///
/// Implementations must be thread-safe (Send + Sync); fetches run on
/// blocking worker threads.
pub trait LineageStore: Send + Sync {
    // === Entity Operations ===

    /// Insert or update an entity
    fn save_entity(&self, entity: &EntityReference) -> StorageResult<()>;

    /// Load an entity by id
    fn load_entity(&self, id: &EntityId) -> StorageResult<Option<EntityReference>>;

    /// Load an entity by type and fully qualified name
    fn find_entity_by_name(&self, entity_type: &str, fqn: &str) -> StorageResult<Option<EntityReference>>;

    /// All entities, ordered by fully qualified name
    fn list_entities(&self) -> StorageResult<Vec<EntityReference>>;

    /// Delete an entity and every lineage edge touching it
    fn delete_entity(&self, id: &EntityId) -> StorageResult<bool>;

    // === Lineage Operations ===

    /// Record that data flows along `edge`
    ///
    /// Implementations validate through [`LineageStore::resolve_edge`]. An
    /// existing edge with the same endpoints gets the new details.
    fn add_lineage(&self, edge: &Edge) -> StorageResult<()>;

    /// Remove the edge between two entities
    fn delete_lineage(&self, from: &EntityId, to: &EntityId) -> StorageResult<bool>;

    /// Edges flowing into `id`
    fn upstream_edges_of(&self, id: &EntityId) -> StorageResult<Vec<Edge>>;

    /// Edges flowing out of `id`
    fn downstream_edges_of(&self, id: &EntityId) -> StorageResult<Vec<Edge>>;

    /// Edges adjacent to `id` in a direction
    fn edges_of(&self, id: &EntityId, direction: LineageDirection) -> StorageResult<Vec<Edge>> {
        match direction {
            LineageDirection::Upstream => self.upstream_edges_of(id),
            LineageDirection::Downstream => self.downstream_edges_of(id),
        }
    }

    /// Validate an edge against stored entities and return it ready to persist
    ///
    /// Both endpoints and any pipeline must exist; the stored pipeline
    /// reference replaces the one supplied. Column lineage is only allowed
    /// between two tables, with columns named `<table fqn>.<column>`.
    fn resolve_edge(&self, edge: &Edge) -> StorageResult<Edge> {
        let from = self
            .load_entity(&edge.from_entity)?
            .ok_or_else(|| StorageError::EntityNotFound(edge.from_entity.to_string()))?;
        let to = self
            .load_entity(&edge.to_entity)?
            .ok_or_else(|| StorageError::EntityNotFound(edge.to_entity.to_string()))?;

        let mut resolved = edge.clone();
        if let Some(details) = resolved.lineage_details.as_mut() {
            if let Some(pipeline) = details.pipeline.as_ref() {
                let stored = self
                    .load_entity(&pipeline.id)?
                    .ok_or_else(|| StorageError::EntityNotFound(pipeline.id.to_string()))?;
                details.pipeline = Some(stored);
            }
            self.validate_columns(&from, &to, details)?;
        }
        if resolved.lineage_details.as_ref().is_some_and(LineageDetails::is_empty) {
            resolved.lineage_details = None;
        }
        Ok(resolved)
    }

    /// Column lineage checks used by [`LineageStore::resolve_edge`]
    fn validate_columns(
        &self,
        from: &EntityReference,
        to: &EntityReference,
        details: &LineageDetails,
    ) -> StorageResult<()> {
        if details.columns_lineage.is_empty() {
            return Ok(());
        }
        if !from.is_table() || !to.is_table() {
            return Err(StorageError::InvalidLineage(
                "Column level lineage is only allowed between two tables.".to_string(),
            ));
        }

        for column_lineage in &details.columns_lineage {
            let to_column = column_lineage
                .to_column
                .as_deref()
                .ok_or_else(|| StorageError::InvalidLineage("Column lineage without toColumn".to_string()))?;
            if !is_column_of(to_column, &to.fully_qualified_name) {
                return Err(invalid_column(to_column));
            }

            for from_column in &column_lineage.from_columns {
                if is_column_of(from_column, &from.fully_qualified_name) {
                    continue;
                }
                let table_fqn = match from_column.rsplit_once('.') {
                    Some((table, column)) if !column.is_empty() => table,
                    _ => return Err(invalid_column(from_column)),
                };
                if self.find_entity_by_name(TABLE, table_fqn)?.is_none() {
                    return Err(invalid_column(from_column));
                }
            }
        }
        Ok(())
    }

    /// Lineage around `entity`, `depth` hops each way
    ///
    /// Upstream edges point into the visited nodes, downstream edges out of
    /// them. Each node is expanded at most once per direction, so cycles
    /// terminate. `nodes` never repeats and never contains the focal entity.
    fn get_lineage(&self, entity: &EntityReference, depth: LineageDepth) -> StorageResult<EntityLineage> {
        let mut lineage = EntityLineage::new(entity.clone());

        for direction in [LineageDirection::Upstream, LineageDirection::Downstream] {
            let mut visited: HashSet<EntityId> = HashSet::from([entity.id.clone()]);
            let mut frontier = vec![entity.id.clone()];

            for _ in 0..depth.get(direction) {
                let mut next = Vec::new();
                for id in &frontier {
                    for edge in self.edges_of(id, direction)? {
                        let neighbour_id = direction.far_end(&edge).clone();
                        let Some(neighbour) = self.load_entity(&neighbour_id)? else {
                            continue;
                        };
                        if !lineage.contains_node(&neighbour.id) {
                            lineage.nodes.push(neighbour);
                        }
                        if visited.insert(neighbour_id.clone()) {
                            next.push(neighbour_id);
                        }
                        lineage.edges_mut(direction).push(edge);
                    }
                }
                if next.is_empty() {
                    break;
                }
                frontier = next;
            }
        }

        Ok(lineage)
    }
}

/// Extension trait for opening stores from paths
pub trait OpenStore: LineageStore + Sized {
    /// Open or create a store at the given path
    fn open(path: impl AsRef<Path>) -> StorageResult<Self>;

    /// Create an in-memory store (useful for testing)
    fn open_in_memory() -> StorageResult<Self>;
}

fn is_column_of(column: &str, table_fqn: &str) -> bool {
    column
        .strip_prefix(table_fqn)
        .and_then(|rest| rest.strip_prefix('.'))
        .is_some_and(|name| !name.is_empty())
}

fn invalid_column(column: &str) -> StorageError {
    StorageError::InvalidLineage(format!("Invalid column name {column}"))
}
