//! GraphStore trait definition
//!
//! Defines the abstract interface for all corpus graph operations.
//! `Neo4jClient` is the production implementation; `MockGraphStore`
//! keeps everything in memory for tests.

use crate::neo4j::models::*;
use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

/// Abstract interface for all graph database operations.
///
/// Implementations enforce the storage invariants: one edge per
/// `(from, to, edge_type)`, node deletion cascading to edges and tag links,
/// tag deletion orphaning child tags. Input validation (title length,
/// registered edge types, tag cycles) lives in `CorpusManager`.
#[async_trait]
pub trait GraphStore: Send + Sync {
    // ========================================================================
    // Corpus node operations
    // ========================================================================

    /// Create a new node
    async fn create_node(&self, node: &CorpusNode) -> Result<()>;

    /// Get a node by ID
    async fn get_node(&self, id: Uuid) -> Result<Option<CorpusNode>>;

    /// Get several nodes by ID. Unknown IDs are skipped.
    async fn get_nodes(&self, ids: &[Uuid]) -> Result<Vec<CorpusNode>>;

    /// List nodes, optionally restricted to a set of types
    async fn list_nodes(&self, node_types: Option<&[CorpusNodeType]>) -> Result<Vec<CorpusNode>>;

    /// Partial update of the mutable node fields; bumps `updated_at`
    async fn update_node(
        &self,
        id: Uuid,
        title: Option<String>,
        description: Option<Option<String>>,
        status: Option<String>,
    ) -> Result<()>;

    /// Delete a node together with every edge and tag link touching it
    async fn delete_node(&self, id: Uuid) -> Result<()>;

    // ========================================================================
    // Edge operations
    // ========================================================================

    /// Create an edge. Fails with `CorpusError::DuplicateEdge` if an edge with
    /// the same `(from, to, edge_type)` already exists.
    async fn create_edge(&self, edge: &CorpusEdge) -> Result<()>;

    /// Get an edge by ID
    async fn get_edge(&self, id: Uuid) -> Result<Option<CorpusEdge>>;

    /// List edges, optionally restricted to a set of edge types
    async fn list_edges(&self, edge_types: Option<&[String]>) -> Result<Vec<CorpusEdge>>;

    /// Partial update of weight / description
    async fn update_edge(
        &self,
        id: Uuid,
        weight: Option<f64>,
        description: Option<Option<String>>,
    ) -> Result<()>;

    /// Delete an edge
    async fn delete_edge(&self, id: Uuid) -> Result<()>;

    /// All edges with at least one endpoint in `node_ids`, in either direction.
    ///
    /// This is the one-hop expansion primitive used by the store-backed
    /// graph walk: one call per BFS level.
    async fn get_incident_edges(&self, node_ids: &[Uuid]) -> Result<Vec<CorpusEdge>>;

    /// All edges whose both endpoints are in `node_ids` (induced subgraph)
    async fn get_edges_among(&self, node_ids: &[Uuid]) -> Result<Vec<CorpusEdge>>;

    // ========================================================================
    // Edge type registry
    // ========================================================================

    /// List registered edge types
    async fn list_edge_types(&self) -> Result<Vec<EdgeTypeDefinition>>;

    /// Get an edge type by key
    async fn get_edge_type(&self, key: &str) -> Result<Option<EdgeTypeDefinition>>;

    /// Register an edge type, or update its label/description
    async fn upsert_edge_type(&self, def: &EdgeTypeDefinition) -> Result<()>;

    // ========================================================================
    // Tag operations
    // ========================================================================

    /// Create a tag. Fails with `CorpusError::DuplicateTag` on a name clash.
    async fn create_tag(&self, tag: &Tag) -> Result<()>;

    /// Get a tag by ID
    async fn get_tag(&self, id: Uuid) -> Result<Option<Tag>>;

    /// List all tags
    async fn list_tags(&self) -> Result<Vec<Tag>>;

    /// Partial update of a tag (rename, re-parent, describe)
    async fn update_tag(
        &self,
        id: Uuid,
        name: Option<String>,
        parent_id: Option<Option<Uuid>>,
        description: Option<Option<String>>,
    ) -> Result<()>;

    /// Delete a tag, dropping its node links; child tags become roots
    async fn delete_tag(&self, id: Uuid) -> Result<()>;

    /// Attach a tag to a node (idempotent)
    async fn add_node_tag(&self, node_id: Uuid, tag_id: Uuid) -> Result<()>;

    /// Detach a tag from a node
    async fn remove_node_tag(&self, node_id: Uuid, tag_id: Uuid) -> Result<()>;

    /// Tags directly attached to a node
    async fn get_node_tags(&self, node_id: Uuid) -> Result<Vec<Tag>>;

    /// `(node_id, tag_id)` pairs for every node carrying any of `tag_ids`
    async fn get_nodes_with_any_tag(&self, tag_ids: &[Uuid]) -> Result<Vec<(Uuid, Uuid)>>;

    // ========================================================================
    // Health
    // ========================================================================

    /// Check connectivity to the backing store
    async fn health_check(&self) -> Result<bool>;
}
