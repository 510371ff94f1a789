//! Merging an expansion fragment into the current lineage graph

use crate::graph::{EntityId, EntityLineage, LineageDirection};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// How repeated nodes and edges are treated on merge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergePolicy {
    /// Concatenate fragment edges and nodes as they are. Merging the same
    /// fragment twice doubles them.
    #[default]
    Append,
    /// Key nodes by id and edges by (from, to); re-merging is idempotent.
    Deduplicate,
}

/// Merge `fragment` (the result of expanding one node in `direction`) into
/// `current`, returning a new graph
///
/// Only the edge list for `direction` is extended. Fragment nodes are kept
/// only when they are the far endpoint of one of those edges, so unrelated
/// nodes returned by the fetch never enter the graph. The focal entity and
/// the other direction's edges are untouched.
pub fn merge_lineage(
    current: &EntityLineage,
    fragment: &EntityLineage,
    direction: LineageDirection,
) -> EntityLineage {
    merge_lineage_with(current, fragment, direction, MergePolicy::Append)
}

/// [`merge_lineage`] with an explicit [`MergePolicy`]
pub fn merge_lineage_with(
    current: &EntityLineage,
    fragment: &EntityLineage,
    direction: LineageDirection,
    policy: MergePolicy,
) -> EntityLineage {
    let fragment_edges = direction.edges(fragment);
    let reached: HashSet<&EntityId> = fragment_edges.iter().map(|e| direction.far_end(e)).collect();

    let mut merged = current.clone();

    match policy {
        MergePolicy::Append => {
            merged.edges_mut(direction).extend(fragment_edges.iter().cloned());
            merged.nodes.extend(
                fragment
                    .nodes
                    .iter()
                    .filter(|n| reached.contains(&n.id))
                    .cloned(),
            );
        }
        MergePolicy::Deduplicate => {
            let mut edge_keys: HashSet<_> = direction.edges(current).iter().map(|e| e.key()).collect();
            let new_edges: Vec<_> = fragment_edges
                .iter()
                .filter(|e| edge_keys.insert(e.key()))
                .cloned()
                .collect();
            merged.edges_mut(direction).extend(new_edges);

            let mut node_ids: HashSet<EntityId> =
                current.all_nodes().into_iter().map(|n| n.id.clone()).collect();
            let new_nodes: Vec<_> = fragment
                .nodes
                .iter()
                .filter(|n| reached.contains(&n.id) && node_ids.insert(n.id.clone()))
                .cloned()
                .collect();
            merged.nodes.extend(new_nodes);
        }
    }

    merged
}
