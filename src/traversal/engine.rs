//! Traversal engine: shortest paths, subgraphs and filtered graph views

use super::bfs;
use super::models::*;
use super::source::{LoadedGraph, NeighborSource, StoreFrontier};
use crate::neo4j::models::*;
use crate::neo4j::GraphStore;
use anyhow::Result;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use uuid::Uuid;

/// Read-only graph queries over the corpus.
///
/// Unknown node ids never raise: they produce an empty path or view.
pub struct TraversalEngine {
    store: Arc<dyn GraphStore>,
    backend: TraversalBackend,
}

impl TraversalEngine {
    pub fn new(store: Arc<dyn GraphStore>, backend: TraversalBackend) -> Self {
        Self { store, backend }
    }

    pub fn backend(&self) -> TraversalBackend {
        self.backend
    }

    async fn neighbor_source(&self) -> Result<Box<dyn NeighborSource>> {
        let source: Box<dyn NeighborSource> = match self.backend {
            TraversalBackend::Store => Box::new(StoreFrontier::new(self.store.clone())),
            TraversalBackend::InMemory => Box::new(LoadedGraph::load(self.store.as_ref()).await?),
        };
        Ok(source)
    }

    /// Minimal-hop path between two nodes, edges walked in either direction.
    ///
    /// Empty when either node is unknown or no path fits within `max_depth`.
    pub async fn find_shortest_path(
        &self,
        from: Uuid,
        to: Uuid,
        max_depth: usize,
    ) -> Result<Vec<PathStep>> {
        let Some(start) = self.store.get_node(from).await? else {
            return Ok(vec![]);
        };
        if from == to {
            return Ok(vec![PathStep {
                node_id: start.id,
                title: start.title,
                node_type: start.node_type,
                edge_id: None,
                edge_type: None,
            }]);
        }
        if self.store.get_node(to).await?.is_none() {
            return Ok(vec![]);
        }

        let source = self.neighbor_source().await?;
        let Some(hops) = bfs::shortest_path(source.as_ref(), from, to, max_depth).await? else {
            tracing::debug!(%from, %to, max_depth, "No path within depth ceiling");
            return Ok(vec![]);
        };

        let ids: Vec<Uuid> = hops.iter().map(|h| h.node_id).collect();
        let nodes: HashMap<Uuid, CorpusNode> = self
            .store
            .get_nodes(&ids)
            .await?
            .into_iter()
            .map(|n| (n.id, n))
            .collect();

        let mut steps = Vec::with_capacity(hops.len());
        for hop in hops {
            let Some(node) = nodes.get(&hop.node_id) else {
                // Edge pointing at a node deleted mid-request
                tracing::warn!(node_id = %hop.node_id, "Path node vanished during traversal");
                return Ok(vec![]);
            };
            let (edge_id, edge_type) = match hop.via {
                Some((id, edge_type)) => (Some(id), Some(edge_type)),
                None => (None, None),
            };
            steps.push(PathStep {
                node_id: node.id,
                title: node.title.clone(),
                node_type: node.node_type,
                edge_id,
                edge_type,
            });
        }
        Ok(steps)
    }

    /// Nodes within `depth` hops of `center` (center included) and every
    /// stored edge between two of them.
    pub async fn get_subgraph(&self, center: Uuid, depth: usize) -> Result<GraphView> {
        if self.store.get_node(center).await?.is_none() {
            return Ok(GraphView::default());
        }

        let source = self.neighbor_source().await?;
        let ids = bfs::reachable(source.as_ref(), center, depth).await?;

        let nodes = self.store.get_nodes(&ids).await?;
        let edges = self.store.get_edges_among(&ids).await?;

        tracing::debug!(
            %center,
            depth,
            nodes = nodes.len(),
            edges = edges.len(),
            "Extracted subgraph"
        );
        Ok(GraphView { nodes, edges })
    }

    /// Whole graph restricted by node and edge types.
    ///
    /// With a node-type filter, edges must also have both endpoints among the
    /// kept nodes. An empty filter list means no filter.
    pub async fn get_filtered_graph(
        &self,
        node_types: Option<&[CorpusNodeType]>,
        edge_types: Option<&[String]>,
    ) -> Result<GraphView> {
        let node_types = node_types.filter(|t| !t.is_empty());
        let edge_types = edge_types.filter(|t| !t.is_empty());

        let nodes = self.store.list_nodes(node_types).await?;
        let mut edges = self.store.list_edges(edge_types).await?;

        if node_types.is_some() {
            let kept: HashSet<Uuid> = nodes.iter().map(|n| n.id).collect();
            edges.retain(|e| kept.contains(&e.from_node_id) && kept.contains(&e.to_node_id));
        }

        Ok(GraphView { nodes, edges })
    }
}
