//! Node classification for the lineage explorer

use super::leaf::LeafNodes;
use crate::graph::{EntityId, EntityLineage, LineageDirection};
use serde::{Deserialize, Serialize};

/// Where a node sits at the edge of the loaded graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Upstream frontier: feeds an upstream edge, is fed by none
    Input,
    /// Downstream frontier: receives a downstream edge, feeds none
    Output,
    Default,
}

impl NodeKind {
    /// The direction in which a node of this kind can grow the graph
    pub fn expandable(&self) -> Option<LineageDirection> {
        match self {
            NodeKind::Input => Some(LineageDirection::Upstream),
            NodeKind::Output => Some(LineageDirection::Downstream),
            NodeKind::Default => None,
        }
    }
}

/// Classify a node by its position among the loaded edges
pub fn classify_node(lineage: &EntityLineage, id: &EntityId) -> NodeKind {
    let down = &lineage.downstream_edges;
    let up = &lineage.upstream_edges;

    let down_to = down.iter().any(|e| &e.to_entity == id);
    let down_from = down.iter().any(|e| &e.from_entity == id);
    let up_from = up.iter().any(|e| &e.from_entity == id);
    let up_to = up.iter().any(|e| &e.to_entity == id);

    if down_to && !down_from {
        NodeKind::Output
    } else if up_from && !up_to {
        NodeKind::Input
    } else {
        NodeKind::Default
    }
}

/// Direction in which the explorer should offer to expand `id`, if any
///
/// Frontier nodes are expandable until they are known leaves.
pub fn expansion_direction(
    lineage: &EntityLineage,
    leaves: &LeafNodes,
    id: &EntityId,
) -> Option<LineageDirection> {
    classify_node(lineage, id)
        .expandable()
        .filter(|direction| !leaves.is_leaf(id, *direction))
}
