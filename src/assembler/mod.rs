//! Lineage graph assembly
//!
//! Pure functions over [`EntityLineage`](crate::graph::EntityLineage)
//! values. Every operation takes its inputs by reference and returns a
//! new value, so callers can detect change by identity.

mod classify;
mod edit;
mod leaf;
mod merge;
mod trace;

use crate::graph::EntityId;
use thiserror::Error;

pub use classify::{classify_node, expansion_direction, NodeKind};
pub use edit::{with_edge_added, without_edge, without_node};
pub use leaf::{record_leaf_if_applicable, LeafNodes, LeafState};
pub use merge::{merge_lineage, merge_lineage_with, MergePolicy};
pub use trace::{trace_node, TracedNodes};

/// Errors from local graph edits
#[derive(Debug, Error)]
pub enum AssembleError {
    #[error("Cannot remove the focal entity: {0}")]
    FocalEntity(EntityId),

    #[error("Node not found: {0}")]
    NodeNotFound(EntityId),
}
