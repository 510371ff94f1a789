//! Tributary: Incremental Data-Lineage Graph Assembler
//!
//! Builds the lineage graph of a data catalog entity one expansion at a
//! time, the way a lineage explorer grows it as a user clicks outward from
//! the focal table, pipeline or dashboard.
//!
//! # Core Concepts
//!
//! - **Lineage**: a focal entity, the nodes around it, and its upstream and
//!   downstream edges
//! - **Fragment**: the lineage returned by expanding one node in one direction
//! - **Leaf**: a node with nothing further in the direction being explored
//! - **Session**: the owned state of one lineage view
//!
//! # Example
//!
//! ```
//! use tributary::{merge_lineage, Edge, EntityLineage, EntityReference, LineageDirection};
//!
//! let a = EntityReference::with_id("a", "table", "shop.public.orders");
//! let b = EntityReference::with_id("b", "table", "shop.public.orders_clean");
//! let current = EntityLineage::seeded(a.clone());
//! let fragment = EntityLineage::new(a)
//!     .with_nodes(vec![b])
//!     .with_downstream_edges(vec![Edge::new("a", "b")]);
//!
//! let merged = merge_lineage(&current, &fragment, LineageDirection::Downstream);
//! assert_eq!(merged.nodes.len(), 2);
//! ```

pub mod assembler;
pub mod config;
mod graph;
pub mod session;
pub mod source;
pub mod storage;

pub use assembler::{
    classify_node, merge_lineage, merge_lineage_with, record_leaf_if_applicable, trace_node, LeafNodes,
    LeafState, MergePolicy, NodeKind, TracedNodes,
};
pub use config::TributaryConfig;
pub use graph::{
    ColumnLineage, Edge, EdgeKey, EntityId, EntityLineage, EntityReference, LineageDepth, LineageDetails,
    LineageDirection, ParseDirectionError,
};
pub use session::{ExpandOutcome, LineageError, LineageResult, LineageSession};
pub use source::{LineageSource, SourceError, StoreSource};
pub use storage::{LineageStore, OpenStore, SqliteStore, StorageError, StorageResult};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
