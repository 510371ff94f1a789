//! Local edits that mirror lineage writes to the catalog

use super::AssembleError;
use crate::graph::{Edge, EdgeKey, EntityId, EntityLineage, EntityReference, LineageDirection};

/// Add `edge` to the `direction` edge list, registering endpoints the graph
/// does not know yet
///
/// An edge with the same (from, to) key already in that list is replaced,
/// matching how the catalog treats a re-added lineage edge.
pub fn with_edge_added(
    current: &EntityLineage,
    edge: Edge,
    direction: LineageDirection,
    endpoints: &[EntityReference],
) -> EntityLineage {
    let mut updated = current.clone();
    let key = edge.key();

    let edges = updated.edges_mut(direction);
    match edges.iter().position(|e| e.key() == key) {
        Some(idx) => edges[idx] = edge,
        None => edges.push(edge),
    }

    for endpoint in endpoints {
        if key_touches(&key, &endpoint.id) && !updated.contains_node(&endpoint.id) {
            updated.nodes.push(endpoint.clone());
        }
    }

    updated
}

/// Drop every edge with this key from both edge lists
///
/// Nodes stay; a node with no edges is still a valid member of the graph.
pub fn without_edge(current: &EntityLineage, key: &EdgeKey) -> EntityLineage {
    let mut updated = current.clone();
    updated.upstream_edges.retain(|e| &e.key() != key);
    updated.downstream_edges.retain(|e| &e.key() != key);
    updated
}

/// Drop a node and every edge touching it
pub fn without_node(current: &EntityLineage, id: &EntityId) -> Result<EntityLineage, AssembleError> {
    if &current.entity.id == id {
        return Err(AssembleError::FocalEntity(id.clone()));
    }
    if !current.contains_node(id) {
        return Err(AssembleError::NodeNotFound(id.clone()));
    }

    let mut updated = current.clone();
    updated.nodes.retain(|n| &n.id != id);
    updated.upstream_edges.retain(|e| !e.touches(id));
    updated.downstream_edges.retain(|e| !e.touches(id));
    Ok(updated)
}

fn key_touches(key: &EdgeKey, id: &EntityId) -> bool {
    &key.from_entity == id || &key.to_entity == id
}
