//! Leaf tracking: which nodes have nothing further in a direction

use crate::graph::{EntityId, EntityLineage, LineageDirection};
use serde::{Deserialize, Serialize};

/// Resolution of one node in one direction
///
/// Every pair starts `Unknown` and moves to `Leaf` or `HasChildren` on its
/// first successful fetch. It never moves again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeafState {
    Unknown,
    Leaf,
    HasChildren,
}

/// Nodes known to be leaves, per direction
///
/// Append-only. Each id appears at most once per list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeafNodes {
    /// Nodes with no upstream edges
    #[serde(default)]
    pub up_stream_node: Vec<EntityId>,
    /// Nodes with no downstream edges
    #[serde(default)]
    pub down_stream_node: Vec<EntityId>,
}

impl LeafNodes {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when nothing has been recorded in either direction
    pub fn is_empty(&self) -> bool {
        self.up_stream_node.is_empty() && self.down_stream_node.is_empty()
    }

    /// Leaves recorded for a direction
    pub fn leaves(&self, direction: LineageDirection) -> &[EntityId] {
        match direction {
            LineageDirection::Downstream => &self.down_stream_node,
            LineageDirection::Upstream => &self.up_stream_node,
        }
    }

    fn leaves_mut(&mut self, direction: LineageDirection) -> &mut Vec<EntityId> {
        match direction {
            LineageDirection::Downstream => &mut self.down_stream_node,
            LineageDirection::Upstream => &mut self.up_stream_node,
        }
    }

    /// Is `id` a known leaf in `direction`?
    ///
    /// An empty structure always answers false: not-yet-expanded nodes are
    /// unknown, and must keep their expand affordance.
    pub fn is_leaf(&self, id: &EntityId, direction: LineageDirection) -> bool {
        if self.is_empty() {
            return false;
        }
        self.leaves(direction).contains(id)
    }
}

/// Record the fragment's entity as a leaf when it has no edges in `direction`
///
/// Returns a new value; `leaves` is left as it was.
pub fn record_leaf_if_applicable(
    leaves: &LeafNodes,
    fragment: &EntityLineage,
    direction: LineageDirection,
) -> LeafNodes {
    let mut updated = leaves.clone();
    let id = &fragment.entity.id;
    if direction.edges(fragment).is_empty() && !updated.leaves(direction).contains(id) {
        updated.leaves_mut(direction).push(id.clone());
    }
    updated
}
