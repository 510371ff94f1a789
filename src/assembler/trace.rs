//! Tracing a node's full upstream and downstream reach

use crate::graph::{Edge, EntityId, EntityLineage};
use std::collections::{HashMap, HashSet, VecDeque};

/// Nodes reachable from a selected node over the loaded edges
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TracedNodes {
    /// The selected node
    pub origin: EntityId,
    /// Everything that (transitively) feeds the origin, nearest first
    pub incomers: Vec<EntityId>,
    /// Everything the origin (transitively) feeds, nearest first
    pub outgoers: Vec<EntityId>,
}

impl TracedNodes {
    /// True if `id` is the origin or lies on either side of it
    pub fn contains(&self, id: &EntityId) -> bool {
        &self.origin == id || self.incomers.contains(id) || self.outgoers.contains(id)
    }

    /// True if `edge` lies on a traced path through the origin
    pub fn is_traced_edge(&self, edge: &Edge) -> bool {
        let incomer_edge = self.incomers.contains(&edge.from_entity)
            && (self.incomers.contains(&edge.to_entity) || edge.to_entity == self.origin);
        let outgoer_edge = self.outgoers.contains(&edge.to_entity)
            && (self.outgoers.contains(&edge.from_entity) || edge.from_entity == self.origin);
        incomer_edge || outgoer_edge
    }
}

/// Collect every node upstream and downstream of `origin`
///
/// Walks both edge lists; the graph may contain cycles.
pub fn trace_node(lineage: &EntityLineage, origin: &EntityId) -> TracedNodes {
    let index = EdgeIndex::build(lineage);
    TracedNodes {
        origin: origin.clone(),
        incomers: walk(origin, |id| index.incoming(id)),
        outgoers: walk(origin, |id| index.outgoing(id)),
    }
}

/// Breadth-first walk; the origin itself is never reported
fn walk<'a, F>(origin: &'a EntityId, neighbours: F) -> Vec<EntityId>
where
    F: Fn(&EntityId) -> Vec<&'a EntityId>,
{
    let mut visited: HashSet<&EntityId> = HashSet::from([origin]);
    let mut queue = VecDeque::from([origin]);
    let mut found = Vec::new();

    while let Some(current) = queue.pop_front() {
        for next in neighbours(current) {
            if visited.insert(next) {
                found.push(next.clone());
                queue.push_back(next);
            }
        }
    }

    found
}

/// Adjacency over both edge lists
struct EdgeIndex<'a> {
    outgoing: HashMap<&'a EntityId, Vec<&'a EntityId>>,
    incoming: HashMap<&'a EntityId, Vec<&'a EntityId>>,
}

impl<'a> EdgeIndex<'a> {
    fn build(lineage: &'a EntityLineage) -> Self {
        let mut outgoing: HashMap<&EntityId, Vec<&EntityId>> = HashMap::new();
        let mut incoming: HashMap<&EntityId, Vec<&EntityId>> = HashMap::new();

        for edge in lineage.all_edges() {
            outgoing.entry(&edge.from_entity).or_default().push(&edge.to_entity);
            incoming.entry(&edge.to_entity).or_default().push(&edge.from_entity);
        }

        Self { outgoing, incoming }
    }

    fn outgoing(&self, id: &EntityId) -> Vec<&'a EntityId> {
        self.outgoing.get(id).cloned().unwrap_or_default()
    }

    fn incoming(&self, id: &EntityId) -> Vec<&'a EntityId> {
        self.incoming.get(id).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::EntityReference;

    fn ids(list: &[EntityId]) -> Vec<&str> {
        list.iter().map(EntityId::as_str).collect()
    }

    /// raw -> clean (focal) -> mart -> dash, plus other -> mart
    fn graph() -> EntityLineage {
        EntityLineage::seeded(EntityReference::with_id("clean", "table", "clean"))
            .with_upstream_edges(vec![Edge::new("raw", "clean")])
            .with_downstream_edges(vec![
                Edge::new("clean", "mart"),
                Edge::new("mart", "dash"),
                Edge::new("other", "mart"),
            ])
    }

    #[test]
    fn traces_both_sides() {
        let traced = trace_node(&graph(), &"mart".into());
        assert_eq!(ids(&traced.incomers), vec!["clean", "other", "raw"]);
        assert_eq!(ids(&traced.outgoers), vec!["dash"]);
        assert!(traced.contains(&"mart".into()));
        assert!(!traced.contains(&"nowhere".into()));
    }

    #[test]
    fn traced_edges_follow_the_path() {
        let traced = trace_node(&graph(), &"clean".into());
        assert!(traced.is_traced_edge(&Edge::new("raw", "clean")));
        assert!(traced.is_traced_edge(&Edge::new("mart", "dash")));
        // `other` feeds mart but is not upstream of clean
        assert!(!traced.is_traced_edge(&Edge::new("other", "mart")));
    }

    #[test]
    fn cycles_terminate() {
        let lineage = EntityLineage::seeded(EntityReference::with_id("a", "table", "a"))
            .with_downstream_edges(vec![Edge::new("a", "b"), Edge::new("b", "c"), Edge::new("c", "a")]);
        let traced = trace_node(&lineage, &"a".into());
        assert_eq!(ids(&traced.outgoers), vec!["b", "c"]);
        assert_eq!(ids(&traced.incomers), vec!["c", "b"]);
    }

    #[test]
    fn unknown_origin_traces_nothing() {
        let traced = trace_node(&graph(), &"nowhere".into());
        assert!(traced.incomers.is_empty());
        assert!(traced.outgoers.is_empty());
    }
}
