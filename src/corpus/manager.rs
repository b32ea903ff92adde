//! Corpus CRUD operations with validation
//!
//! `GraphStore` implementations only enforce the storage invariants
//! (edge uniqueness, cascades). Everything that needs a look at other
//! records first, like endpoint existence, registered edge types or the
//! tag tree shape, is checked here.

use super::models::*;
use crate::neo4j::models::*;
use crate::neo4j::GraphStore;
use anyhow::Result;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use uuid::Uuid;

/// Manager for nodes, edges, the edge-type registry and tags
pub struct CorpusManager {
    neo4j: Arc<dyn GraphStore>,
}

fn validate_title(title: &str) -> Result<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(CorpusError::InvalidInput("Title must not be empty".into()).into());
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(CorpusError::InvalidInput(format!(
            "Title must be at most {} characters",
            MAX_TITLE_LEN
        ))
        .into());
    }
    Ok(title.to_string())
}

fn validate_status(status: &str) -> Result<String> {
    let status = status.trim();
    if status.is_empty() || status.chars().count() > MAX_STATUS_LEN {
        return Err(CorpusError::InvalidInput(format!(
            "Status must be 1-{} characters",
            MAX_STATUS_LEN
        ))
        .into());
    }
    Ok(status.to_string())
}

fn validate_weight(weight: f64) -> Result<f64> {
    if !weight.is_finite() || weight < 0.0 {
        return Err(
            CorpusError::InvalidInput("Weight must be a non-negative number".into()).into(),
        );
    }
    Ok(weight)
}

fn is_snake_case_key(key: &str) -> bool {
    !key.is_empty()
        && key.starts_with(|c: char| c.is_ascii_lowercase())
        && key
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

impl CorpusManager {
    /// Create a new corpus manager
    pub fn new(neo4j: Arc<dyn GraphStore>) -> Self {
        Self { neo4j }
    }

    // ========================================================================
    // Node operations
    // ========================================================================

    /// Create a node, optionally tagging it
    pub async fn create_node(&self, req: CreateNodeRequest) -> Result<CorpusNode> {
        let title = validate_title(&req.title)?;
        let mut node = CorpusNode::new(req.node_type, title, req.description);
        if let Some(status) = req.status {
            node.status = validate_status(&status)?;
        }

        for tag_id in &req.tag_ids {
            self.require_tag(*tag_id).await?;
        }

        self.neo4j.create_node(&node).await?;
        for tag_id in req.tag_ids {
            self.neo4j.add_node_tag(node.id, tag_id).await?;
        }

        tracing::debug!(node_id = %node.id, node_type = %node.node_type, "Created corpus node");
        Ok(node)
    }

    /// Get a node by ID
    pub async fn get_node(&self, id: Uuid) -> Result<Option<CorpusNode>> {
        self.neo4j.get_node(id).await
    }

    /// List nodes, optionally filtered by type
    pub async fn list_nodes(
        &self,
        node_types: Option<&[CorpusNodeType]>,
    ) -> Result<Vec<CorpusNode>> {
        self.neo4j.list_nodes(node_types).await
    }

    /// Partial update; returns the updated node
    pub async fn update_node(&self, id: Uuid, req: UpdateNodeRequest) -> Result<CorpusNode> {
        self.require_node(id).await?;

        let title = req.title.as_deref().map(validate_title).transpose()?;
        let status = req.status.as_deref().map(validate_status).transpose()?;

        self.neo4j
            .update_node(id, title, req.description, status)
            .await?;

        self.require_node(id).await
    }

    /// Delete a node and everything attached to it
    pub async fn delete_node(&self, id: Uuid) -> Result<()> {
        self.require_node(id).await?;
        self.neo4j.delete_node(id).await?;
        tracing::debug!(node_id = %id, "Deleted corpus node");
        Ok(())
    }

    async fn require_node(&self, id: Uuid) -> Result<CorpusNode> {
        self.neo4j
            .get_node(id)
            .await?
            .ok_or_else(|| CorpusError::NodeNotFound(id).into())
    }

    // ========================================================================
    // Edge operations
    // ========================================================================

    /// Create an edge between two existing nodes
    pub async fn create_edge(&self, req: CreateEdgeRequest) -> Result<CorpusEdge> {
        if req.from_node_id == req.to_node_id {
            return Err(CorpusError::SelfLoop(req.from_node_id).into());
        }
        self.require_node(req.from_node_id).await?;
        self.require_node(req.to_node_id).await?;

        if self.neo4j.get_edge_type(&req.edge_type).await?.is_none() {
            return Err(CorpusError::UnknownEdgeType(req.edge_type).into());
        }

        let mut edge = CorpusEdge::new(req.from_node_id, req.to_node_id, req.edge_type);
        if let Some(weight) = req.weight {
            edge.weight = validate_weight(weight)?;
        }
        edge.description = req.description;

        self.neo4j.create_edge(&edge).await?;

        tracing::debug!(
            edge_id = %edge.id,
            from = %edge.from_node_id,
            to = %edge.to_node_id,
            edge_type = %edge.edge_type,
            "Created corpus edge"
        );
        Ok(edge)
    }

    /// Get an edge by ID
    pub async fn get_edge(&self, id: Uuid) -> Result<Option<CorpusEdge>> {
        self.neo4j.get_edge(id).await
    }

    /// List edges, optionally filtered by type
    pub async fn list_edges(&self, edge_types: Option<&[String]>) -> Result<Vec<CorpusEdge>> {
        self.neo4j.list_edges(edge_types).await
    }

    /// Partial update of weight / description
    pub async fn update_edge(&self, id: Uuid, req: UpdateEdgeRequest) -> Result<CorpusEdge> {
        self.require_edge(id).await?;
        let weight = req.weight.map(validate_weight).transpose()?;
        self.neo4j.update_edge(id, weight, req.description).await?;
        self.require_edge(id).await
    }

    /// Delete an edge
    pub async fn delete_edge(&self, id: Uuid) -> Result<()> {
        self.require_edge(id).await?;
        self.neo4j.delete_edge(id).await
    }

    async fn require_edge(&self, id: Uuid) -> Result<CorpusEdge> {
        self.neo4j
            .get_edge(id)
            .await?
            .ok_or_else(|| CorpusError::EdgeNotFound(id).into())
    }

    // ========================================================================
    // Edge type registry
    // ========================================================================

    /// List registered edge types
    pub async fn list_edge_types(&self) -> Result<Vec<EdgeTypeDefinition>> {
        self.neo4j.list_edge_types().await
    }

    /// Register a new edge type, or relabel an existing one
    pub async fn register_edge_type(
        &self,
        req: RegisterEdgeTypeRequest,
    ) -> Result<EdgeTypeDefinition> {
        let key = req.key.trim().to_string();
        if !is_snake_case_key(&key) {
            return Err(CorpusError::InvalidInput(format!(
                "Edge type key '{}' must be snake_case",
                req.key
            ))
            .into());
        }
        let label = req.label.trim().to_string();
        if label.is_empty() {
            return Err(CorpusError::InvalidInput("Label must not be empty".into()).into());
        }

        let def = EdgeTypeDefinition {
            key,
            label,
            description: req.description,
        };
        self.neo4j.upsert_edge_type(&def).await?;
        tracing::info!(key = %def.key, "Registered edge type");
        Ok(def)
    }

    // ========================================================================
    // Tag operations
    // ========================================================================

    /// Create a tag
    pub async fn create_tag(&self, req: CreateTagRequest) -> Result<Tag> {
        let name = req.name.trim().to_string();
        if name.is_empty() {
            return Err(CorpusError::InvalidInput("Tag name must not be empty".into()).into());
        }
        if let Some(parent_id) = req.parent_id {
            self.require_tag(parent_id).await?;
        }

        let tag = Tag::new(name, req.parent_id, req.description);
        self.neo4j.create_tag(&tag).await?;
        Ok(tag)
    }

    /// Get a tag by ID
    pub async fn get_tag(&self, id: Uuid) -> Result<Option<Tag>> {
        self.neo4j.get_tag(id).await
    }

    /// List all tags
    pub async fn list_tags(&self) -> Result<Vec<Tag>> {
        self.neo4j.list_tags().await
    }

    /// Rename, re-parent or describe a tag
    pub async fn update_tag(&self, id: Uuid, req: UpdateTagRequest) -> Result<Tag> {
        self.require_tag(id).await?;

        let name = match req.name {
            Some(name) => {
                let name = name.trim().to_string();
                if name.is_empty() {
                    return Err(
                        CorpusError::InvalidInput("Tag name must not be empty".into()).into(),
                    );
                }
                Some(name)
            }
            None => None,
        };

        if let Some(Some(parent_id)) = req.parent_id {
            self.require_tag(parent_id).await?;
            self.ensure_no_tag_cycle(id, parent_id).await?;
        }

        self.neo4j
            .update_tag(id, name, req.parent_id, req.description)
            .await?;
        self.require_tag(id).await
    }

    /// Delete a tag; children become roots
    pub async fn delete_tag(&self, id: Uuid) -> Result<()> {
        self.require_tag(id).await?;
        self.neo4j.delete_tag(id).await
    }

    /// Walk up from `parent_id`; reaching `tag_id` means the re-parent closes a loop.
    async fn ensure_no_tag_cycle(&self, tag_id: Uuid, parent_id: Uuid) -> Result<()> {
        let parents: HashMap<Uuid, Option<Uuid>> = self
            .neo4j
            .list_tags()
            .await?
            .into_iter()
            .map(|t| (t.id, t.parent_id))
            .collect();

        let mut seen = HashSet::new();
        let mut current = Some(parent_id);
        while let Some(id) = current {
            if id == tag_id {
                return Err(CorpusError::TagCycle {
                    tag: tag_id,
                    parent: parent_id,
                }
                .into());
            }
            if !seen.insert(id) {
                break;
            }
            current = parents.get(&id).copied().flatten();
        }
        Ok(())
    }

    async fn require_tag(&self, id: Uuid) -> Result<Tag> {
        self.neo4j
            .get_tag(id)
            .await?
            .ok_or_else(|| CorpusError::TagNotFound(id).into())
    }

    // ========================================================================
    // Node-tag links
    // ========================================================================

    /// Tags directly attached to a node
    pub async fn get_node_tags(&self, node_id: Uuid) -> Result<Vec<Tag>> {
        self.require_node(node_id).await?;
        self.neo4j.get_node_tags(node_id).await
    }

    /// Attach a tag to a node (idempotent)
    pub async fn add_node_tag(&self, node_id: Uuid, tag_id: Uuid) -> Result<()> {
        self.require_node(node_id).await?;
        self.require_tag(tag_id).await?;
        self.neo4j.add_node_tag(node_id, tag_id).await
    }

    /// Detach a tag from a node
    pub async fn remove_node_tag(&self, node_id: Uuid, tag_id: Uuid) -> Result<()> {
        self.require_node(node_id).await?;
        self.neo4j.remove_node_tag(node_id, tag_id).await
    }

    /// Replace the node's tag set; returns the resulting tags
    pub async fn set_node_tags(&self, node_id: Uuid, tag_ids: Vec<Uuid>) -> Result<Vec<Tag>> {
        self.require_node(node_id).await?;
        for tag_id in &tag_ids {
            self.require_tag(*tag_id).await?;
        }

        let wanted: HashSet<Uuid> = tag_ids.into_iter().collect();
        let current = self.neo4j.get_node_tags(node_id).await?;

        for tag in &current {
            if !wanted.contains(&tag.id) {
                self.neo4j.remove_node_tag(node_id, tag.id).await?;
            }
        }
        let current_ids: HashSet<Uuid> = current.iter().map(|t| t.id).collect();
        for tag_id in wanted.difference(&current_ids) {
            self.neo4j.add_node_tag(node_id, *tag_id).await?;
        }

        self.neo4j.get_node_tags(node_id).await
    }
}
