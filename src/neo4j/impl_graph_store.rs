//! `GraphStore` implementation for `Neo4jClient`.
//!
//! Every method simply delegates to the corresponding inherent method on `Neo4jClient`.

use async_trait::async_trait;
use uuid::Uuid;

use super::client::Neo4jClient;
use super::models::*;
use super::traits::GraphStore;

#[async_trait]
impl GraphStore for Neo4jClient {
    // ========================================================================
    // Corpus node operations
    // ========================================================================

    async fn create_node(&self, node: &CorpusNode) -> anyhow::Result<()> {
        self.create_node(node).await
    }

    async fn get_node(&self, id: Uuid) -> anyhow::Result<Option<CorpusNode>> {
        self.get_node(id).await
    }

    async fn get_nodes(&self, ids: &[Uuid]) -> anyhow::Result<Vec<CorpusNode>> {
        self.get_nodes(ids).await
    }

    async fn list_nodes(
        &self,
        node_types: Option<&[CorpusNodeType]>,
    ) -> anyhow::Result<Vec<CorpusNode>> {
        self.list_nodes(node_types).await
    }

    async fn update_node(
        &self,
        id: Uuid,
        title: Option<String>,
        description: Option<Option<String>>,
        status: Option<String>,
    ) -> anyhow::Result<()> {
        self.update_node(id, title, description, status).await
    }

    async fn delete_node(&self, id: Uuid) -> anyhow::Result<()> {
        self.delete_node(id).await
    }

    // ========================================================================
    // Edge operations
    // ========================================================================

    async fn create_edge(&self, edge: &CorpusEdge) -> anyhow::Result<()> {
        self.create_edge(edge).await
    }

    async fn get_edge(&self, id: Uuid) -> anyhow::Result<Option<CorpusEdge>> {
        self.get_edge(id).await
    }

    async fn list_edges(&self, edge_types: Option<&[String]>) -> anyhow::Result<Vec<CorpusEdge>> {
        self.list_edges(edge_types).await
    }

    async fn update_edge(
        &self,
        id: Uuid,
        weight: Option<f64>,
        description: Option<Option<String>>,
    ) -> anyhow::Result<()> {
        self.update_edge(id, weight, description).await
    }

    async fn delete_edge(&self, id: Uuid) -> anyhow::Result<()> {
        self.delete_edge(id).await
    }

    async fn get_incident_edges(&self, node_ids: &[Uuid]) -> anyhow::Result<Vec<CorpusEdge>> {
        self.get_incident_edges(node_ids).await
    }

    async fn get_edges_among(&self, node_ids: &[Uuid]) -> anyhow::Result<Vec<CorpusEdge>> {
        self.get_edges_among(node_ids).await
    }

    // ========================================================================
    // Edge type registry
    // ========================================================================

    async fn list_edge_types(&self) -> anyhow::Result<Vec<EdgeTypeDefinition>> {
        self.list_edge_types().await
    }

    async fn get_edge_type(&self, key: &str) -> anyhow::Result<Option<EdgeTypeDefinition>> {
        self.get_edge_type(key).await
    }

    async fn upsert_edge_type(&self, def: &EdgeTypeDefinition) -> anyhow::Result<()> {
        self.upsert_edge_type(def).await
    }

    // ========================================================================
    // Tag operations
    // ========================================================================

    async fn create_tag(&self, tag: &Tag) -> anyhow::Result<()> {
        self.create_tag(tag).await
    }

    async fn get_tag(&self, id: Uuid) -> anyhow::Result<Option<Tag>> {
        self.get_tag(id).await
    }

    async fn list_tags(&self) -> anyhow::Result<Vec<Tag>> {
        self.list_tags().await
    }

    async fn update_tag(
        &self,
        id: Uuid,
        name: Option<String>,
        parent_id: Option<Option<Uuid>>,
        description: Option<Option<String>>,
    ) -> anyhow::Result<()> {
        self.update_tag(id, name, parent_id, description).await
    }

    async fn delete_tag(&self, id: Uuid) -> anyhow::Result<()> {
        self.delete_tag(id).await
    }

    async fn add_node_tag(&self, node_id: Uuid, tag_id: Uuid) -> anyhow::Result<()> {
        self.add_node_tag(node_id, tag_id).await
    }

    async fn remove_node_tag(&self, node_id: Uuid, tag_id: Uuid) -> anyhow::Result<()> {
        self.remove_node_tag(node_id, tag_id).await
    }

    async fn get_node_tags(&self, node_id: Uuid) -> anyhow::Result<Vec<Tag>> {
        self.get_node_tags(node_id).await
    }

    async fn get_nodes_with_any_tag(&self, tag_ids: &[Uuid]) -> anyhow::Result<Vec<(Uuid, Uuid)>> {
        self.get_nodes_with_any_tag(tag_ids).await
    }

    // ========================================================================
    // Health
    // ========================================================================

    async fn health_check(&self) -> anyhow::Result<bool> {
        match self.execute("RETURN 1 AS ping").await {
            Ok(_) => Ok(true),
            Err(_) => Ok(false),
        }
    }
}
