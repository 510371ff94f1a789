//! Expansion direction

use super::edge::Edge;
use super::entity::EntityId;
use super::lineage::EntityLineage;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Direction in which a node is expanded
///
/// On the wire the catalog UI calls these `"to"` (downstream) and
/// `"from"` (upstream).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LineageDirection {
    /// Follow data towards its consumers
    #[serde(rename = "to")]
    Downstream,
    /// Follow data back to its producers
    #[serde(rename = "from")]
    Upstream,
}

impl LineageDirection {
    /// The edge list of `lineage` that belongs to this direction
    pub fn edges<'a>(&self, lineage: &'a EntityLineage) -> &'a [Edge] {
        match self {
            LineageDirection::Downstream => &lineage.downstream_edges,
            LineageDirection::Upstream => &lineage.upstream_edges,
        }
    }

    /// The endpoint of `edge` that lies further out in this direction
    pub fn far_end<'a>(&self, edge: &'a Edge) -> &'a EntityId {
        match self {
            LineageDirection::Downstream => &edge.to_entity,
            LineageDirection::Upstream => &edge.from_entity,
        }
    }

    /// The endpoint of `edge` closer to the node being expanded
    pub fn near_end<'a>(&self, edge: &'a Edge) -> &'a EntityId {
        self.opposite().far_end(edge)
    }

    pub fn opposite(&self) -> Self {
        match self {
            LineageDirection::Downstream => LineageDirection::Upstream,
            LineageDirection::Upstream => LineageDirection::Downstream,
        }
    }

    /// Wire name ("to" / "from")
    pub fn as_str(&self) -> &'static str {
        match self {
            LineageDirection::Downstream => "to",
            LineageDirection::Upstream => "from",
        }
    }
}

impl std::fmt::Display for LineageDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How many hops to fetch on each side of an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineageDepth {
    pub upstream: u32,
    pub downstream: u32,
}

impl LineageDepth {
    pub fn new(upstream: u32, downstream: u32) -> Self {
        Self { upstream, downstream }
    }

    /// One hop in `direction`, none in the other: what a node expansion asks for
    pub fn towards(direction: LineageDirection) -> Self {
        match direction {
            LineageDirection::Downstream => Self::new(0, 1),
            LineageDirection::Upstream => Self::new(1, 0),
        }
    }

    pub fn get(&self, direction: LineageDirection) -> u32 {
        match direction {
            LineageDirection::Downstream => self.downstream,
            LineageDirection::Upstream => self.upstream,
        }
    }
}

impl Default for LineageDepth {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown lineage direction '{0}' (expected to/downstream or from/upstream)")]
pub struct ParseDirectionError(pub String);

impl FromStr for LineageDirection {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "to" | "downstream" => Ok(LineageDirection::Downstream),
            "from" | "upstream" => Ok(LineageDirection::Upstream),
            _ => Err(ParseDirectionError(s.to_string())),
        }
    }
}
