//! Entity references: the nodes of a lineage graph

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a catalog entity
///
/// Serializes as a plain string (usually a UUID).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Create a new random EntityId
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create an EntityId from an existing string
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Entity type used for tables; column lineage is only legal between two of these.
pub const TABLE: &str = "table";

/// Reference to a catalog entity (table, pipeline, dashboard, topic, ...)
///
/// Field names follow the catalog REST API (`type`, `fullyQualifiedName`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityReference {
    /// Unique identifier
    pub id: EntityId,
    /// Entity type, e.g. "table", "pipeline", "dashboard"
    #[serde(rename = "type")]
    pub entity_type: String,
    /// Short name
    #[serde(default)]
    pub name: String,
    /// Dotted fully qualified name, e.g. "mysql.shop.public.orders"
    #[serde(default)]
    pub fully_qualified_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Soft-deleted entities still show up in lineage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted: Option<bool>,
}

impl EntityReference {
    /// Create a reference with a fresh id
    ///
    /// The short name defaults to the last segment of the FQN.
    pub fn new(entity_type: impl Into<String>, fully_qualified_name: impl Into<String>) -> Self {
        Self::with_id(EntityId::new(), entity_type, fully_qualified_name)
    }

    /// Create a reference with a specific id
    pub fn with_id(
        id: impl Into<EntityId>,
        entity_type: impl Into<String>,
        fully_qualified_name: impl Into<String>,
    ) -> Self {
        let fully_qualified_name = fully_qualified_name.into();
        let name = fully_qualified_name
            .rsplit('.')
            .next()
            .unwrap_or_default()
            .to_string();
        Self {
            id: id.into(),
            entity_type: entity_type.into(),
            name,
            fully_qualified_name,
            display_name: None,
            description: None,
            deleted: None,
        }
    }

    /// Override the short name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the display name
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Name to show to a person: display name, then name, then FQN
    pub fn label(&self) -> &str {
        match &self.display_name {
            Some(display) if !display.is_empty() => display,
            _ if !self.name.is_empty() => &self.name,
            _ => &self.fully_qualified_name,
        }
    }

    /// True when this entity is a table
    pub fn is_table(&self) -> bool {
        self.entity_type == TABLE
    }
}
