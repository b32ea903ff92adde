//! Traversal result types and limits

use crate::neo4j::models::{CorpusEdge, CorpusNode, CorpusNodeType};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

pub const DEFAULT_PATH_MAX_DEPTH: usize = 10;
pub const MAX_PATH_DEPTH: usize = 50;
pub const DEFAULT_SUBGRAPH_DEPTH: usize = 2;
pub const MAX_SUBGRAPH_DEPTH: usize = 5;

/// Reject depths outside `1..=max`. Shared by the HTTP and CLI entry points.
pub fn check_depth(name: &str, value: usize, max: usize) -> Result<usize, String> {
    if (1..=max).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{} must be between 1 and {}", name, max))
    }
}

/// One node of a shortest path.
///
/// `edge_id` / `edge_type` describe the edge used to reach this node from
/// the previous step; both are `None` on the first step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PathStep {
    pub node_id: Uuid,
    pub title: String,
    pub node_type: CorpusNodeType,
    pub edge_id: Option<Uuid>,
    pub edge_type: Option<String>,
}

/// A set of nodes plus the edges between them
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphView {
    pub nodes: Vec<CorpusNode>,
    pub edges: Vec<CorpusEdge>,
}

impl GraphView {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}

/// Where the breadth-first walk gets its neighbors from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraversalBackend {
    /// One batched incident-edge query per BFS level
    #[default]
    Store,
    /// Whole edge list loaded into an in-process graph per request
    InMemory,
}

impl FromStr for TraversalBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "store" => Ok(Self::Store),
            "in_memory" | "memory" => Ok(Self::InMemory),
            other => Err(format!("Unknown traversal backend: {}", other)),
        }
    }
}

impl std::fmt::Display for TraversalBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store => write!(f, "store"),
            Self::InMemory => write!(f, "in_memory"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_parse() {
        assert_eq!("store".parse::<TraversalBackend>(), Ok(TraversalBackend::Store));
        assert_eq!(
            "In-Memory".parse::<TraversalBackend>(),
            Ok(TraversalBackend::InMemory)
        );
        assert!("cloud".parse::<TraversalBackend>().is_err());
        assert_eq!(TraversalBackend::default(), TraversalBackend::Store);
    }

    #[test]
    fn test_first_step_serializes_null_edge() {
        let step = PathStep {
            node_id: Uuid::nil(),
            title: "X".into(),
            node_type: CorpusNodeType::Goal,
            edge_id: None,
            edge_type: None,
        };
        let json = serde_json::to_value(&step).unwrap();
        assert!(json["edge_id"].is_null());
        assert_eq!(json["node_type"], "goal");
    }
}
