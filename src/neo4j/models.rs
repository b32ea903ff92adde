//! Neo4j graph models for the policy corpus

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Corpus Nodes
// ============================================================================

/// Kind of policy entity a corpus node represents.
///
/// Assigned at creation and never changed afterwards.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum CorpusNodeType {
    Dossier,
    Goal,
    Instrument,
    PolicyFramework,
    Measure,
    PoliticalInput,
    Problem,
    Effect,
    PolicyOption,
    SourceDocument,
}

impl CorpusNodeType {
    pub const ALL: [CorpusNodeType; 10] = [
        Self::Dossier,
        Self::Goal,
        Self::Instrument,
        Self::PolicyFramework,
        Self::Measure,
        Self::PoliticalInput,
        Self::Problem,
        Self::Effect,
        Self::PolicyOption,
        Self::SourceDocument,
    ];

    /// Stable snake_case key, used as the stored property value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dossier => "dossier",
            Self::Goal => "goal",
            Self::Instrument => "instrument",
            Self::PolicyFramework => "policy_framework",
            Self::Measure => "measure",
            Self::PoliticalInput => "political_input",
            Self::Problem => "problem",
            Self::Effect => "effect",
            Self::PolicyOption => "policy_option",
            Self::SourceDocument => "source_document",
        }
    }
}

impl std::fmt::Display for CorpusNodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CorpusNodeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase().replace('-', "_");
        Self::ALL
            .iter()
            .find(|t| t.as_str() == key)
            .copied()
            .ok_or_else(|| format!("Unknown node type: {}", s))
    }
}

/// A typed vertex in the policy graph
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CorpusNode {
    pub id: Uuid,
    pub node_type: CorpusNodeType,
    pub title: String,
    pub description: Option<String>,
    /// Free-form short status ("active", "archived", "draft", ...)
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CorpusNode {
    pub fn new(node_type: CorpusNodeType, title: String, description: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            node_type,
            title,
            description,
            status: DEFAULT_NODE_STATUS.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

pub const DEFAULT_NODE_STATUS: &str = "active";
pub const MAX_TITLE_LEN: usize = 500;
pub const MAX_STATUS_LEN: usize = 50;

// ============================================================================
// Edges
// ============================================================================

/// A directed, typed, weighted relation between two corpus nodes.
///
/// Direction is display metadata only: traversal treats every edge as
/// walkable both ways.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CorpusEdge {
    pub id: Uuid,
    pub from_node_id: Uuid,
    pub to_node_id: Uuid,
    /// Key into the edge-type registry
    pub edge_type: String,
    /// Relative strength for display (default 1.0), never a traversal cost
    pub weight: f64,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl CorpusEdge {
    pub fn new(from_node_id: Uuid, to_node_id: Uuid, edge_type: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            from_node_id,
            to_node_id,
            edge_type,
            weight: DEFAULT_EDGE_WEIGHT,
            description: None,
            created_at: Utc::now(),
        }
    }

    /// True if `node_id` is one of the two endpoints
    pub fn touches(&self, node_id: Uuid) -> bool {
        self.from_node_id == node_id || self.to_node_id == node_id
    }

    /// The endpoint opposite to `node_id`, if `node_id` is an endpoint
    pub fn other_end(&self, node_id: Uuid) -> Option<Uuid> {
        if self.from_node_id == node_id {
            Some(self.to_node_id)
        } else if self.to_node_id == node_id {
            Some(self.from_node_id)
        } else {
            None
        }
    }
}

pub const DEFAULT_EDGE_WEIGHT: f64 = 1.0;

/// Registry entry describing one edge type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EdgeTypeDefinition {
    /// snake_case key stored on each edge
    pub key: String,
    /// Human label shown in the UI
    pub label: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl EdgeTypeDefinition {
    pub fn new(key: &str, label: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            description: None,
        }
    }
}

/// Fallback relation type for suggestions that name an unknown type.
pub const GENERIC_EDGE_TYPE: &str = "relates_to";

/// Edge types seeded into an empty registry.
pub fn default_edge_types() -> Vec<EdgeTypeDefinition> {
    vec![
        EdgeTypeDefinition::new(GENERIC_EDGE_TYPE, "Relates to"),
        EdgeTypeDefinition::new("contributes_to", "Contributes to"),
        EdgeTypeDefinition::new("implements", "Implements"),
        EdgeTypeDefinition::new("part_of", "Part of"),
        EdgeTypeDefinition::new("addresses", "Addresses"),
        EdgeTypeDefinition::new("causes", "Causes"),
        EdgeTypeDefinition::new("based_on", "Based on"),
        EdgeTypeDefinition::new("refers_to", "Refers to"),
    ]
}

// ============================================================================
// Tags
// ============================================================================

/// A categorical label; tags form a tree through `parent_id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    pub parent_id: Option<Uuid>,
    pub description: Option<String>,
}

impl Tag {
    pub fn new(name: String, parent_id: Option<Uuid>, description: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            parent_id,
            description,
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Domain errors raised by the corpus store and manager.
///
/// Carried inside `anyhow::Error`; the API layer downcasts them to pick a
/// status code.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum CorpusError {
    #[error("Node {0} not found")]
    NodeNotFound(Uuid),

    #[error("Edge {0} not found")]
    EdgeNotFound(Uuid),

    #[error("Tag {0} not found")]
    TagNotFound(Uuid),

    #[error("Edge {edge_type} from {from} to {to} already exists")]
    DuplicateEdge {
        from: Uuid,
        to: Uuid,
        edge_type: String,
    },

    #[error("Tag named '{0}' already exists")]
    DuplicateTag(String),

    #[error("Unknown edge type: {0}")]
    UnknownEdgeType(String),

    #[error("An edge cannot connect node {0} to itself")]
    SelfLoop(Uuid),

    #[error("Setting parent {parent} on tag {tag} would create a cycle")]
    TagCycle { tag: Uuid, parent: Uuid },

    #[error("{0}")]
    InvalidInput(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_type_round_trips_through_str() {
        for t in CorpusNodeType::ALL {
            assert_eq!(t.as_str().parse::<CorpusNodeType>().unwrap(), t);
        }
        assert_eq!(
            "Policy-Framework".parse::<CorpusNodeType>().unwrap(),
            CorpusNodeType::PolicyFramework
        );
        assert!("unicorn".parse::<CorpusNodeType>().is_err());
    }

    #[test]
    fn test_node_type_serde_matches_as_str() {
        let json = serde_json::to_string(&CorpusNodeType::PoliticalInput).unwrap();
        assert_eq!(json, "\"political_input\"");
    }

    #[test]
    fn test_edge_other_end() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let edge = CorpusEdge::new(a, b, "relates_to".into());
        assert_eq!(edge.other_end(a), Some(b));
        assert_eq!(edge.other_end(b), Some(a));
        assert_eq!(edge.other_end(Uuid::new_v4()), None);
        assert!(edge.touches(a));
        assert_eq!(edge.weight, 1.0);
    }

    #[test]
    fn test_default_edge_types_include_generic() {
        let types = default_edge_types();
        assert!(types.iter().any(|t| t.key == GENERIC_EDGE_TYPE));
        let mut keys: Vec<_> = types.iter().map(|t| t.key.clone()).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), types.len());
    }
}
