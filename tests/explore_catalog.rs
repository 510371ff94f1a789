//! End-to-end exploration of a SQLite lineage catalog
//!
//! Opens a view on a stored entity and grows it one expansion at a time,
//! the way a user clicks outward in the lineage explorer.

mod common;

use common::{catalog, entity, shop_catalog, table};
use tributary::{
    classify_node, trace_node, EdgeKey, EntityId, LeafState, LineageDepth, LineageDirection, LineageError,
    LineageSession, LineageStore, MergePolicy, NodeKind, StoreSource,
};

const UP: LineageDirection = LineageDirection::Upstream;
const DOWN: LineageDirection = LineageDirection::Downstream;

fn id(s: &str) -> EntityId {
    EntityId::from(s)
}

#[tokio::test]
async fn explore_shop_until_every_frontier_is_a_leaf() {
    let (store, source) = shop_catalog();
    let focal = entity(&store, "orders_clean");
    let session = LineageSession::load(&focal, &source, LineageDepth::default(), MergePolicy::Append)
        .await
        .unwrap();

    let lineage = session.lineage();
    assert_eq!(lineage.node_count(), 3);
    assert_eq!(lineage.upstream_edges.len(), 2);
    assert_eq!(lineage.downstream_edges.len(), 1);
    assert_eq!(session.leaf_state(&id("orders_clean"), UP), LeafState::HasChildren);

    assert_eq!(session.expandable(&id("orders")), Some(UP));
    assert_eq!(session.expandable(&id("customers")), Some(UP));
    assert_eq!(session.expandable(&id("revenue")), Some(DOWN));
    assert_eq!(session.expandable(&id("orders_clean")), None);

    let outcome = session.expand(&entity(&store, "orders"), UP, &source).await.unwrap();
    assert_eq!((outcome.nodes_added, outcome.edges_added, outcome.leaf), (1, 1, false));
    assert_eq!(session.expandable(&id("orders")), None);
    assert_eq!(session.expandable(&id("raw_orders")), Some(UP));

    for (node, direction) in [("raw_orders", UP), ("customers", UP), ("revenue", DOWN)] {
        let outcome = session.expand(&entity(&store, node), direction, &source).await.unwrap();
        assert!(outcome.leaf, "{node} should be a leaf");
        assert_eq!((outcome.nodes_added, outcome.edges_added), (0, 0));
        assert_eq!(session.leaf_state(&id(node), direction), LeafState::Leaf);
    }

    let lineage = session.lineage();
    assert_eq!(lineage.all_nodes().len(), 5);
    assert_eq!(lineage.edge_count(), 4);
    assert!(lineage.has_edge(&EdgeKey { from_entity: id("raw_orders"), to_entity: id("orders") }));

    let leaves = session.leaves();
    assert_eq!(leaves.up_stream_node.len(), 2);
    assert_eq!(leaves.down_stream_node, vec![id("revenue")]);
    for node in lineage.all_nodes() {
        assert_eq!(session.expandable(&node.id), None, "{} still offered", node.id);
    }
}

#[tokio::test]
async fn resolved_expansion_is_refused() {
    let (store, source) = shop_catalog();
    let focal = entity(&store, "orders_clean");
    let session = LineageSession::load(&focal, &source, LineageDepth::default(), MergePolicy::Append)
        .await
        .unwrap();

    let orders = entity(&store, "orders");
    session.expand(&orders, UP, &source).await.unwrap();
    let before = session.lineage();

    let err = session.expand(&orders, UP, &source).await.unwrap_err();
    assert!(matches!(err, LineageError::AlreadyResolved { direction: UP, .. }));
    assert!(std::sync::Arc::ptr_eq(&before, &session.lineage()));
}

#[tokio::test]
async fn classification_and_tracing_follow_the_assembled_graph() {
    let (store, source) = shop_catalog();
    let focal = entity(&store, "orders_clean");
    let session = LineageSession::load(&focal, &source, LineageDepth::default(), MergePolicy::Append)
        .await
        .unwrap();
    session.expand(&entity(&store, "orders"), UP, &source).await.unwrap();

    let lineage = session.lineage();
    assert_eq!(classify_node(&lineage, &id("raw_orders")), NodeKind::Input);
    assert_eq!(classify_node(&lineage, &id("orders")), NodeKind::Default);
    assert_eq!(classify_node(&lineage, &id("revenue")), NodeKind::Output);

    let traced = trace_node(&lineage, &id("orders"));
    assert!(traced.incomers.contains(&id("raw_orders")));
    assert!(traced.outgoers.contains(&id("orders_clean")));
    assert!(traced.outgoers.contains(&id("revenue")));
    assert!(!traced.contains(&id("customers")));

    let customers_edge = lineage
        .upstream_edges
        .iter()
        .find(|e| e.from_entity == id("customers"))
        .unwrap();
    assert!(!traced.is_traced_edge(customers_edge));
}

#[tokio::test]
async fn deduplicate_keeps_cycles_from_growing_the_node_list() {
    for (policy, expected_nodes) in [(MergePolicy::Append, 1), (MergePolicy::Deduplicate, 0)] {
        let store = catalog(&[table("a"), table("b")], &[("a", "b"), ("b", "a")]);
        let source = StoreSource::new(store.clone());
        let session = LineageSession::load(&entity(&store, "a"), &source, LineageDepth::default(), policy)
            .await
            .unwrap();
        assert_eq!(session.lineage().node_count(), 1);

        let outcome = session.expand(&entity(&store, "b"), DOWN, &source).await.unwrap();
        assert_eq!(outcome.nodes_added, expected_nodes, "{policy:?}");
        assert_eq!(outcome.edges_added, 1, "{policy:?}");
        assert_eq!(session.lineage().all_nodes().len(), 2);
    }
}

#[tokio::test]
async fn view_mirrors_catalog_edits() {
    let (store, source) = shop_catalog();
    let focal = entity(&store, "orders_clean");
    let session = LineageSession::load(&focal, &source, LineageDepth::default(), MergePolicy::Append)
        .await
        .unwrap();

    let audit = table("orders_audit");
    store.save_entity(&audit).unwrap();
    let edge = tributary::Edge::new("orders_clean", "orders_audit");
    store.add_lineage(&edge).unwrap();
    session.add_edge(edge.clone(), DOWN, &[focal.clone(), audit]);

    let lineage = session.lineage();
    assert!(lineage.has_edge(&edge.key()));
    assert!(lineage.contains_node(&id("orders_audit")));

    assert!(store.delete_lineage(&id("orders_clean"), &id("orders_audit")).unwrap());
    session.remove_edge(&edge.key());
    assert!(!session.lineage().has_edge(&edge.key()));

    session.remove_node(&id("customers")).unwrap();
    let lineage = session.lineage();
    assert!(!lineage.contains_node(&id("customers")));
    assert!(lineage.all_edges().all(|e| !e.touches(&id("customers"))));
}

#[tokio::test]
async fn unknown_node_fails_without_touching_the_view() {
    let (store, source) = shop_catalog();
    let focal = entity(&store, "orders_clean");
    let session = LineageSession::load(&focal, &source, LineageDepth::default(), MergePolicy::Append)
        .await
        .unwrap();
    let before = session.lineage();

    let ghost = table("ghost");
    let err = session.expand(&ghost, UP, &source).await.unwrap_err();
    assert!(matches!(err, LineageError::Fetch(_)));
    assert!(std::sync::Arc::ptr_eq(&before, &session.lineage()));
    assert_eq!(session.leaf_state(&ghost.id, UP), LeafState::Unknown);
    assert!(!session.is_expanding(&ghost.id, UP));
}
