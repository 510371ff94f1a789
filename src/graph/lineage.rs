//! EntityLineage: the lineage graph around one focal entity

use super::direction::LineageDirection;
use super::edge::{Edge, EdgeKey};
use super::entity::{EntityId, EntityReference};
use serde::{Deserialize, Serialize};

/// A lineage graph (or a fragment of one) centred on a focal entity
///
/// Missing arrays on the wire deserialize as empty. `nodes` may or may not
/// contain the focal entity; use [`EntityLineage::all_nodes`] to see both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityLineage {
    /// The focal entity
    pub entity: EntityReference,
    #[serde(default)]
    pub nodes: Vec<EntityReference>,
    /// Edges whose data flows into the focal side of the graph
    #[serde(default)]
    pub upstream_edges: Vec<Edge>,
    /// Edges whose data flows out of the focal side of the graph
    #[serde(default)]
    pub downstream_edges: Vec<Edge>,
}

impl EntityLineage {
    /// A lineage that knows only its focal entity
    pub fn new(entity: EntityReference) -> Self {
        Self {
            entity,
            nodes: Vec::new(),
            upstream_edges: Vec::new(),
            downstream_edges: Vec::new(),
        }
    }

    /// The starting graph of a lineage view: the focal entity is its only node
    pub fn seeded(entity: EntityReference) -> Self {
        let nodes = vec![entity.clone()];
        Self {
            nodes,
            ..Self::new(entity)
        }
    }

    pub fn with_nodes(mut self, nodes: Vec<EntityReference>) -> Self {
        self.nodes = nodes;
        self
    }

    pub fn with_upstream_edges(mut self, edges: Vec<Edge>) -> Self {
        self.upstream_edges = edges;
        self
    }

    pub fn with_downstream_edges(mut self, edges: Vec<Edge>) -> Self {
        self.downstream_edges = edges;
        self
    }

    /// Look up a node (or the focal entity) by id
    pub fn get_node(&self, id: &EntityId) -> Option<&EntityReference> {
        if &self.entity.id == id {
            return Some(&self.entity);
        }
        self.nodes.iter().find(|n| &n.id == id)
    }

    pub fn contains_node(&self, id: &EntityId) -> bool {
        self.get_node(id).is_some()
    }

    /// The focal entity followed by every listed node, first occurrence per id
    pub fn all_nodes(&self) -> Vec<&EntityReference> {
        let mut seen = std::collections::HashSet::new();
        std::iter::once(&self.entity)
            .chain(self.nodes.iter())
            .filter(|n| seen.insert(&n.id))
            .collect()
    }

    /// Edges belonging to a direction
    pub fn edges(&self, direction: LineageDirection) -> &[Edge] {
        direction.edges(self)
    }

    pub(crate) fn edges_mut(&mut self, direction: LineageDirection) -> &mut Vec<Edge> {
        match direction {
            LineageDirection::Downstream => &mut self.downstream_edges,
            LineageDirection::Upstream => &mut self.upstream_edges,
        }
    }

    /// Every edge, downstream first
    pub fn all_edges(&self) -> impl Iterator<Item = &Edge> {
        self.downstream_edges.iter().chain(self.upstream_edges.iter())
    }

    /// True if an edge with this key exists in either list
    pub fn has_edge(&self, key: &EdgeKey) -> bool {
        self.all_edges().any(|e| &e.key() == key)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.upstream_edges.len() + self.downstream_edges.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(id: &str) -> EntityReference {
        EntityReference::with_id(id, "table", format!("svc.db.s.{id}"))
    }

    #[test]
    fn seeded_contains_focal_node() {
        let lineage = EntityLineage::seeded(entity("a"));
        assert_eq!(lineage.nodes, vec![entity("a")]);
        assert_eq!(lineage.edge_count(), 0);
    }

    #[test]
    fn get_node_finds_focal_entity_outside_nodes() {
        let lineage = EntityLineage::new(entity("a")).with_nodes(vec![entity("b")]);
        assert!(lineage.contains_node(&"a".into()));
        assert!(lineage.contains_node(&"b".into()));
        assert!(!lineage.contains_node(&"c".into()));
    }

    #[test]
    fn all_nodes_skips_repeats() {
        let lineage = EntityLineage::seeded(entity("a")).with_nodes(vec![
            entity("a"),
            entity("b"),
            entity("b"),
        ]);
        let ids: Vec<_> = lineage.all_nodes().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn edges_by_direction() {
        let lineage = EntityLineage::new(entity("b"))
            .with_upstream_edges(vec![Edge::new("a", "b")])
            .with_downstream_edges(vec![Edge::new("b", "c")]);
        assert_eq!(lineage.edges(LineageDirection::Upstream), &[Edge::new("a", "b")]);
        assert_eq!(lineage.edges(LineageDirection::Downstream), &[Edge::new("b", "c")]);
        assert!(lineage.has_edge(&Edge::new("b", "c").key()));
        assert_eq!(lineage.edge_count(), 2);
    }
}
