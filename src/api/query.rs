//! Query parameter structs and validation for graph and list endpoints

use crate::neo4j::models::CorpusNodeType;
use crate::traversal::{
    check_depth, DEFAULT_PATH_MAX_DEPTH, DEFAULT_SUBGRAPH_DEPTH, MAX_PATH_DEPTH,
    MAX_SUBGRAPH_DEPTH,
};
use serde::{Deserialize, Deserializer};
use std::str::FromStr;
use uuid::Uuid;

/// Helper to deserialize optional numbers from query string
fn deserialize_option_from_str<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    use serde::de::Error;
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if !s.is_empty() => s.parse().map(Some).map_err(D::Error::custom),
        _ => Ok(None),
    }
}

fn split_csv(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty())
}

fn parse_node_types<'a>(
    values: impl Iterator<Item = &'a str>,
) -> Result<Vec<CorpusNodeType>, String> {
    values.map(|v| v.parse::<CorpusNodeType>()).collect()
}

/// `GET /api/graph/path`
#[derive(Debug, Deserialize, Clone)]
pub struct PathQuery {
    pub from_id: Uuid,
    pub to_id: Uuid,
    #[serde(default, deserialize_with = "deserialize_option_from_str")]
    pub max_depth: Option<usize>,
}

impl PathQuery {
    /// Validated hop ceiling (default 10, range 1-50)
    pub fn max_depth(&self) -> Result<usize, String> {
        check_depth(
            "max_depth",
            self.max_depth.unwrap_or(DEFAULT_PATH_MAX_DEPTH),
            MAX_PATH_DEPTH,
        )
    }
}

/// `GET /api/nodes/{id}/graph`
#[derive(Debug, Deserialize, Default, Clone)]
pub struct DepthQuery {
    #[serde(default, deserialize_with = "deserialize_option_from_str")]
    pub depth: Option<usize>,
}

impl DepthQuery {
    /// Validated subgraph depth (default 2, range 1-5)
    pub fn depth(&self) -> Result<usize, String> {
        check_depth(
            "depth",
            self.depth.unwrap_or(DEFAULT_SUBGRAPH_DEPTH),
            MAX_SUBGRAPH_DEPTH,
        )
    }
}

/// Node type filter - accepts comma-separated values
#[derive(Debug, Deserialize, Default, Clone)]
pub struct NodeTypeFilter {
    /// e.g. "dossier,goal"
    pub node_type: Option<String>,
}

impl NodeTypeFilter {
    pub fn to_vec(&self) -> Result<Option<Vec<CorpusNodeType>>, String> {
        self.node_type
            .as_deref()
            .map(|raw| parse_node_types(split_csv(raw)))
            .transpose()
            .map(|types| types.filter(|t| !t.is_empty()))
    }
}

/// Edge type filter - accepts comma-separated values
#[derive(Debug, Deserialize, Default, Clone)]
pub struct EdgeTypeFilter {
    /// e.g. "causes,part_of"
    pub edge_type: Option<String>,
}

impl EdgeTypeFilter {
    pub fn to_vec(&self) -> Option<Vec<String>> {
        self.edge_type
            .as_deref()
            .map(|raw| split_csv(raw).map(str::to_string).collect::<Vec<_>>())
            .filter(|t| !t.is_empty())
    }
}

/// `GET /api/graph/search` filters.
///
/// Built from raw query pairs so both `node_types=a&node_types=b` and
/// `node_types=a,b` work.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct GraphSearchFilter {
    pub node_types: Option<Vec<CorpusNodeType>>,
    pub edge_types: Option<Vec<String>>,
}

impl GraphSearchFilter {
    pub fn from_pairs(pairs: &[(String, String)]) -> Result<Self, String> {
        let mut node_types = Vec::new();
        let mut edge_types = Vec::new();

        for (key, value) in pairs {
            match key.as_str() {
                "node_types" | "node_type" => {
                    node_types.extend(parse_node_types(split_csv(value))?);
                }
                "edge_types" | "edge_type" => {
                    edge_types.extend(split_csv(value).map(str::to_string));
                }
                _ => {}
            }
        }

        node_types.sort();
        node_types.dedup();
        edge_types.sort();
        edge_types.dedup();

        Ok(Self {
            node_types: (!node_types.is_empty()).then_some(node_types),
            edge_types: (!edge_types.is_empty()).then_some(edge_types),
        })
    }
}
