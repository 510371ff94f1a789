//! Common test utilities for the lineage integration tests
//!
//! Builds small catalogs in an in-memory SQLite store.

#![allow(dead_code)]

use std::sync::Arc;
use tributary::{Edge, EntityReference, LineageStore, OpenStore, SqliteStore, StoreSource};

pub fn table(id: &str) -> EntityReference {
    EntityReference::with_id(id, "table", format!("mysql.shop.public.{id}"))
}

pub fn dashboard(id: &str) -> EntityReference {
    EntityReference::with_id(id, "dashboard", format!("superset.{id}"))
}

/// In-memory catalog holding `entities` and the `(from, to)` edges
pub fn catalog(entities: &[EntityReference], edges: &[(&str, &str)]) -> Arc<SqliteStore> {
    let store = SqliteStore::open_in_memory().expect("open in-memory store");
    for entity in entities {
        store.save_entity(entity).expect("save entity");
    }
    for (from, to) in edges {
        store.add_lineage(&Edge::new(*from, *to)).expect("add lineage");
    }
    Arc::new(store)
}

/// The shop catalog:
///
/// ```text
/// raw_orders -> orders -> orders_clean -> revenue (dashboard)
///                 customers ----^
/// ```
pub fn shop_catalog() -> (Arc<SqliteStore>, StoreSource<SqliteStore>) {
    let store = catalog(
        &[
            table("raw_orders"),
            table("orders"),
            table("customers"),
            table("orders_clean"),
            dashboard("revenue"),
        ],
        &[
            ("raw_orders", "orders"),
            ("orders", "orders_clean"),
            ("customers", "orders_clean"),
            ("orders_clean", "revenue"),
        ],
    );
    let source = StoreSource::new(Arc::clone(&store));
    (store, source)
}

/// Look an entity up by id, panicking if it is missing
pub fn entity(store: &SqliteStore, id: &str) -> EntityReference {
    store
        .load_entity(&id.into())
        .expect("load entity")
        .unwrap_or_else(|| panic!("no entity {id}"))
}
