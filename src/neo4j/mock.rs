//! In-memory mock implementation of GraphStore for testing.
//!
//! Provides a complete mock of all graph operations using
//! `tokio::sync::RwLock<HashMap<K, V>>` collections.
//! Conditionally compiled with `#[cfg(test)]`.

use crate::neo4j::models::*;
use crate::neo4j::traits::GraphStore;
use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-memory mock implementation of GraphStore for testing.
pub struct MockGraphStore {
    // Entity stores
    pub nodes: RwLock<HashMap<Uuid, CorpusNode>>,
    pub edges: RwLock<HashMap<Uuid, CorpusEdge>>,
    pub edge_types: RwLock<HashMap<String, EdgeTypeDefinition>>,
    pub tags: RwLock<HashMap<Uuid, Tag>>,

    // Relationships
    pub node_tags: RwLock<HashMap<Uuid, Vec<Uuid>>>,

    /// Number of `get_incident_edges` calls, to observe per-level pushdown
    pub incident_calls: AtomicUsize,

    /// Simulated latency of `get_node_tags`
    tag_lookup_delay: Option<Duration>,
}

impl MockGraphStore {
    /// Create a new MockGraphStore with the default edge-type registry.
    pub fn new() -> Self {
        let edge_types = default_edge_types()
            .into_iter()
            .map(|def| (def.key.clone(), def))
            .collect();
        Self {
            nodes: RwLock::new(HashMap::new()),
            edges: RwLock::new(HashMap::new()),
            edge_types: RwLock::new(edge_types),
            tags: RwLock::new(HashMap::new()),
            node_tags: RwLock::new(HashMap::new()),
            incident_calls: AtomicUsize::new(0),
            tag_lookup_delay: None,
        }
    }

    // ========================================================================
    // Builder / seeding methods for tests
    // ========================================================================

    /// Seed a node into the store.
    pub async fn with_node(self, node: CorpusNode) -> Self {
        self.nodes.write().await.insert(node.id, node);
        self
    }

    /// Seed an edge into the store (no validation).
    pub async fn with_edge(self, edge: CorpusEdge) -> Self {
        self.edges.write().await.insert(edge.id, edge);
        self
    }

    /// Seed a tag into the store.
    pub async fn with_tag(self, tag: Tag) -> Self {
        self.tags.write().await.insert(tag.id, tag);
        self
    }

    /// Make every `get_node_tags` call sleep for `delay`.
    pub fn with_tag_lookup_delay(mut self, delay: Duration) -> Self {
        self.tag_lookup_delay = Some(delay);
        self
    }

    /// Seed a node-tag link.
    pub async fn with_node_tag(self, node_id: Uuid, tag_id: Uuid) -> Self {
        let mut links = self.node_tags.write().await;
        let tags = links.entry(node_id).or_default();
        if !tags.contains(&tag_id) {
            tags.push(tag_id);
        }
        drop(links);
        self
    }

    fn sorted_edges<'a>(edges: impl Iterator<Item = &'a CorpusEdge>) -> Vec<CorpusEdge> {
        let mut out: Vec<CorpusEdge> = edges.cloned().collect();
        out.sort_by_key(|e| e.id);
        out
    }
}

impl Default for MockGraphStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GraphStore for MockGraphStore {
    // ========================================================================
    // Corpus node operations
    // ========================================================================

    async fn create_node(&self, node: &CorpusNode) -> Result<()> {
        self.nodes.write().await.insert(node.id, node.clone());
        Ok(())
    }

    async fn get_node(&self, id: Uuid) -> Result<Option<CorpusNode>> {
        Ok(self.nodes.read().await.get(&id).cloned())
    }

    async fn get_nodes(&self, ids: &[Uuid]) -> Result<Vec<CorpusNode>> {
        let nodes = self.nodes.read().await;
        Ok(ids.iter().filter_map(|id| nodes.get(id).cloned()).collect())
    }

    async fn list_nodes(&self, node_types: Option<&[CorpusNodeType]>) -> Result<Vec<CorpusNode>> {
        let nodes = self.nodes.read().await;
        let mut out: Vec<CorpusNode> = nodes
            .values()
            .filter(|n| node_types.map_or(true, |types| types.contains(&n.node_type)))
            .cloned()
            .collect();
        out.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
        Ok(out)
    }

    async fn update_node(
        &self,
        id: Uuid,
        title: Option<String>,
        description: Option<Option<String>>,
        status: Option<String>,
    ) -> Result<()> {
        if let Some(node) = self.nodes.write().await.get_mut(&id) {
            if let Some(title) = title {
                node.title = title;
            }
            if let Some(description) = description {
                node.description = description;
            }
            if let Some(status) = status {
                node.status = status;
            }
            node.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn delete_node(&self, id: Uuid) -> Result<()> {
        self.nodes.write().await.remove(&id);
        // Cascade: edges touching the node and its tag links
        self.edges.write().await.retain(|_, e| !e.touches(id));
        self.node_tags.write().await.remove(&id);
        Ok(())
    }

    // ========================================================================
    // Edge operations
    // ========================================================================

    async fn create_edge(&self, edge: &CorpusEdge) -> Result<()> {
        {
            let nodes = self.nodes.read().await;
            for endpoint in [edge.from_node_id, edge.to_node_id] {
                if !nodes.contains_key(&endpoint) {
                    return Err(CorpusError::NodeNotFound(endpoint).into());
                }
            }
        }
        let mut edges = self.edges.write().await;
        let duplicate = edges.values().any(|e| {
            e.from_node_id == edge.from_node_id
                && e.to_node_id == edge.to_node_id
                && e.edge_type == edge.edge_type
        });
        if duplicate {
            return Err(CorpusError::DuplicateEdge {
                from: edge.from_node_id,
                to: edge.to_node_id,
                edge_type: edge.edge_type.clone(),
            }
            .into());
        }
        edges.insert(edge.id, edge.clone());
        Ok(())
    }

    async fn get_edge(&self, id: Uuid) -> Result<Option<CorpusEdge>> {
        Ok(self.edges.read().await.get(&id).cloned())
    }

    async fn list_edges(&self, edge_types: Option<&[String]>) -> Result<Vec<CorpusEdge>> {
        let edges = self.edges.read().await;
        Ok(Self::sorted_edges(edges.values().filter(|e| {
            edge_types.map_or(true, |types| types.contains(&e.edge_type))
        })))
    }

    async fn update_edge(
        &self,
        id: Uuid,
        weight: Option<f64>,
        description: Option<Option<String>>,
    ) -> Result<()> {
        if let Some(edge) = self.edges.write().await.get_mut(&id) {
            if let Some(weight) = weight {
                edge.weight = weight;
            }
            if let Some(description) = description {
                edge.description = description;
            }
        }
        Ok(())
    }

    async fn delete_edge(&self, id: Uuid) -> Result<()> {
        self.edges.write().await.remove(&id);
        Ok(())
    }

    async fn get_incident_edges(&self, node_ids: &[Uuid]) -> Result<Vec<CorpusEdge>> {
        self.incident_calls.fetch_add(1, Ordering::SeqCst);
        let wanted: HashSet<Uuid> = node_ids.iter().copied().collect();
        let edges = self.edges.read().await;
        Ok(Self::sorted_edges(edges.values().filter(|e| {
            wanted.contains(&e.from_node_id) || wanted.contains(&e.to_node_id)
        })))
    }

    async fn get_edges_among(&self, node_ids: &[Uuid]) -> Result<Vec<CorpusEdge>> {
        let wanted: HashSet<Uuid> = node_ids.iter().copied().collect();
        let edges = self.edges.read().await;
        Ok(Self::sorted_edges(edges.values().filter(|e| {
            wanted.contains(&e.from_node_id) && wanted.contains(&e.to_node_id)
        })))
    }

    // ========================================================================
    // Edge type registry
    // ========================================================================

    async fn list_edge_types(&self) -> Result<Vec<EdgeTypeDefinition>> {
        let mut out: Vec<_> = self.edge_types.read().await.values().cloned().collect();
        out.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(out)
    }

    async fn get_edge_type(&self, key: &str) -> Result<Option<EdgeTypeDefinition>> {
        Ok(self.edge_types.read().await.get(key).cloned())
    }

    async fn upsert_edge_type(&self, def: &EdgeTypeDefinition) -> Result<()> {
        self.edge_types
            .write()
            .await
            .insert(def.key.clone(), def.clone());
        Ok(())
    }

    // ========================================================================
    // Tag operations
    // ========================================================================

    async fn create_tag(&self, tag: &Tag) -> Result<()> {
        let mut tags = self.tags.write().await;
        if tags.values().any(|t| t.name == tag.name) {
            return Err(CorpusError::DuplicateTag(tag.name.clone()).into());
        }
        tags.insert(tag.id, tag.clone());
        Ok(())
    }

    async fn get_tag(&self, id: Uuid) -> Result<Option<Tag>> {
        Ok(self.tags.read().await.get(&id).cloned())
    }

    async fn list_tags(&self) -> Result<Vec<Tag>> {
        let mut out: Vec<_> = self.tags.read().await.values().cloned().collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(out)
    }

    async fn update_tag(
        &self,
        id: Uuid,
        name: Option<String>,
        parent_id: Option<Option<Uuid>>,
        description: Option<Option<String>>,
    ) -> Result<()> {
        let mut tags = self.tags.write().await;
        if let Some(ref name) = name {
            if tags.values().any(|t| t.id != id && &t.name == name) {
                return Err(CorpusError::DuplicateTag(name.clone()).into());
            }
        }
        if let Some(tag) = tags.get_mut(&id) {
            if let Some(name) = name {
                tag.name = name;
            }
            if let Some(parent_id) = parent_id {
                tag.parent_id = parent_id;
            }
            if let Some(description) = description {
                tag.description = description;
            }
        }
        Ok(())
    }

    async fn delete_tag(&self, id: Uuid) -> Result<()> {
        let mut tags = self.tags.write().await;
        tags.remove(&id);
        // Children become roots
        for tag in tags.values_mut() {
            if tag.parent_id == Some(id) {
                tag.parent_id = None;
            }
        }
        drop(tags);
        for links in self.node_tags.write().await.values_mut() {
            links.retain(|t| *t != id);
        }
        Ok(())
    }

    async fn add_node_tag(&self, node_id: Uuid, tag_id: Uuid) -> Result<()> {
        let mut links = self.node_tags.write().await;
        let tags = links.entry(node_id).or_default();
        if !tags.contains(&tag_id) {
            tags.push(tag_id);
        }
        Ok(())
    }

    async fn remove_node_tag(&self, node_id: Uuid, tag_id: Uuid) -> Result<()> {
        if let Some(tags) = self.node_tags.write().await.get_mut(&node_id) {
            tags.retain(|t| *t != tag_id);
        }
        Ok(())
    }

    async fn get_node_tags(&self, node_id: Uuid) -> Result<Vec<Tag>> {
        if let Some(delay) = self.tag_lookup_delay {
            tokio::time::sleep(delay).await;
        }
        let links = self.node_tags.read().await;
        let tags = self.tags.read().await;
        let mut out: Vec<Tag> = links
            .get(&node_id)
            .map(|ids| ids.iter().filter_map(|id| tags.get(id).cloned()).collect())
            .unwrap_or_default();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(out)
    }

    async fn get_nodes_with_any_tag(&self, tag_ids: &[Uuid]) -> Result<Vec<(Uuid, Uuid)>> {
        let links = self.node_tags.read().await;
        let mut out = Vec::new();
        for (node_id, tags) in links.iter() {
            for tag_id in tags {
                if tag_ids.contains(tag_id) {
                    out.push((*node_id, *tag_id));
                }
            }
        }
        out.sort();
        Ok(out)
    }

    // ========================================================================
    // Health
    // ========================================================================

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{test_edge, test_node};

    #[tokio::test]
    async fn test_duplicate_edge_rejected() {
        let a = test_node("A");
        let b = test_node("B");
        let store = MockGraphStore::new()
            .with_node(a.clone())
            .await
            .with_node(b.clone())
            .await;

        store
            .create_edge(&test_edge(a.id, b.id, "causes"))
            .await
            .unwrap();
        let err = store
            .create_edge(&test_edge(a.id, b.id, "causes"))
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CorpusError>(),
            Some(CorpusError::DuplicateEdge { .. })
        ));

        // Same pair, other type or other direction is a distinct edge
        store
            .create_edge(&test_edge(a.id, b.id, "refers_to"))
            .await
            .unwrap();
        store
            .create_edge(&test_edge(b.id, a.id, "causes"))
            .await
            .unwrap();
        assert_eq!(store.list_edges(None).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_delete_node_cascades_edges_and_tags() {
        let a = test_node("A");
        let b = test_node("B");
        let c = test_node("C");
        let tag = Tag::new("energy".into(), None, None);
        let store = MockGraphStore::new()
            .with_node(a.clone())
            .await
            .with_node(b.clone())
            .await
            .with_node(c.clone())
            .await
            .with_edge(test_edge(a.id, b.id, "relates_to"))
            .await
            .with_edge(test_edge(b.id, c.id, "relates_to"))
            .await
            .with_tag(tag.clone())
            .await
            .with_node_tag(b.id, tag.id)
            .await;

        store.delete_node(b.id).await.unwrap();

        assert!(store.list_edges(None).await.unwrap().is_empty());
        assert!(store.get_node_tags(b.id).await.unwrap().is_empty());
        assert!(store.get_node(a.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_tag_orphans_children() {
        let parent = Tag::new("climate".into(), None, None);
        let child = Tag::new("emissions".into(), Some(parent.id), None);
        let node = test_node("A");
        let store = MockGraphStore::new()
            .with_node(node.clone())
            .await
            .with_tag(parent.clone())
            .await
            .with_tag(child.clone())
            .await
            .with_node_tag(node.id, parent.id)
            .await;

        store.delete_tag(parent.id).await.unwrap();

        let child = store.get_tag(child.id).await.unwrap().unwrap();
        assert_eq!(child.parent_id, None);
        assert!(store.get_node_tags(node.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_incident_edges_both_directions() {
        let a = test_node("A");
        let b = test_node("B");
        let c = test_node("C");
        let store = MockGraphStore::new()
            .with_edge(test_edge(b.id, a.id, "part_of"))
            .await
            .with_edge(test_edge(b.id, c.id, "part_of"))
            .await;

        let incident = store.get_incident_edges(&[a.id]).await.unwrap();
        assert_eq!(incident.len(), 1);
        assert_eq!(incident[0].other_end(a.id), Some(b.id));
        assert_eq!(store.incident_calls.load(Ordering::SeqCst), 1);
    }
}
