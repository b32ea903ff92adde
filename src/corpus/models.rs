//! Request models for corpus CRUD operations

use crate::neo4j::models::CorpusNodeType;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`)
/// in PATCH bodies.
fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// Request to create a new corpus node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNodeRequest {
    pub node_type: CorpusNodeType,
    pub title: String,
    pub description: Option<String>,
    /// Defaults to "active"
    pub status: Option<String>,
    /// Tags attached right after creation
    #[serde(default)]
    pub tag_ids: Vec<Uuid>,
}

/// Request to update a node. `node_type` is immutable and not accepted here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateNodeRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Request to create an edge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEdgeRequest {
    pub from_node_id: Uuid,
    pub to_node_id: Uuid,
    pub edge_type: String,
    pub weight: Option<f64>,
    pub description: Option<String>,
}

/// Request to update an edge (weight and description only)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateEdgeRequest {
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub description: Option<Option<String>>,
}

/// Request to register an edge type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterEdgeTypeRequest {
    pub key: String,
    pub label: String,
    pub description: Option<String>,
}

/// Request to create a tag
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTagRequest {
    pub name: String,
    pub parent_id: Option<Uuid>,
    pub description: Option<String>,
}

/// Request to update a tag. `parent_id: null` turns the tag into a root.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTagRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub parent_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub description: Option<Option<String>>,
}

/// Request to replace the full tag set of a node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetNodeTagsRequest {
    pub tag_ids: Vec<Uuid>,
}
