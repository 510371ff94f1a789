//! Directed lineage edges between entities

use super::entity::{EntityId, EntityReference};
use serde::{Deserialize, Serialize};

/// Column-level lineage carried on an edge
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnLineage {
    /// Fully qualified names of the source columns
    #[serde(default)]
    pub from_columns: Vec<String>,
    /// Fully qualified name of the column being produced
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_column: Option<String>,
    /// Transformation applied, if known (e.g. "sum")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
}

impl ColumnLineage {
    pub fn new(from_columns: Vec<String>, to_column: impl Into<String>) -> Self {
        Self {
            from_columns,
            to_column: Some(to_column.into()),
            function: None,
        }
    }
}

/// How the data moves along an edge
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineageDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sql_query: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns_lineage: Vec<ColumnLineage>,
    /// Pipeline that moves the data, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline: Option<EntityReference>,
}

impl LineageDetails {
    pub fn is_empty(&self) -> bool {
        self.sql_query.is_none() && self.columns_lineage.is_empty() && self.pipeline.is_none()
    }
}

/// Identity of an edge: the (from, to) pair
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey {
    pub from_entity: EntityId,
    pub to_entity: EntityId,
}

impl std::fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.from_entity, self.to_entity)
    }
}

/// A directed lineage edge: data flows from `from_entity` into `to_entity`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub from_entity: EntityId,
    pub to_entity: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lineage_details: Option<LineageDetails>,
}

impl Edge {
    /// Create a new edge without details
    pub fn new(from_entity: impl Into<EntityId>, to_entity: impl Into<EntityId>) -> Self {
        Self {
            from_entity: from_entity.into(),
            to_entity: to_entity.into(),
            description: None,
            lineage_details: None,
        }
    }

    /// Attach lineage details
    pub fn with_details(mut self, details: LineageDetails) -> Self {
        self.lineage_details = Some(details);
        self
    }

    pub fn key(&self) -> EdgeKey {
        EdgeKey {
            from_entity: self.from_entity.clone(),
            to_entity: self.to_entity.clone(),
        }
    }

    /// True if `id` is either endpoint
    pub fn touches(&self, id: &EntityId) -> bool {
        &self.from_entity == id || &self.to_entity == id
    }

    /// Pipeline carried in the details, if any
    pub fn pipeline(&self) -> Option<&EntityReference> {
        self.lineage_details.as_ref().and_then(|d| d.pipeline.as_ref())
    }
}
