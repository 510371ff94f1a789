//! Lineage data model

mod direction;
mod edge;
mod entity;
mod lineage;

#[cfg(test)]
mod tests;

pub use direction::{LineageDepth, LineageDirection, ParseDirectionError};
pub use edge::{ColumnLineage, Edge, EdgeKey, LineageDetails};
pub use entity::{EntityId, EntityReference, TABLE};
pub use lineage::EntityLineage;
