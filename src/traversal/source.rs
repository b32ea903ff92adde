//! Neighbor sources for the breadth-first walk.
//!
//! The walk only ever asks one question: "which nodes are one hop away
//! from this frontier, and through which edge?". Two backends answer it:
//!
//! - [`LoadedGraph`] loads every edge once into a `petgraph::UnGraph` and
//!   expands in-process.
//! - [`StoreFrontier`] sends one `get_incident_edges` query per level,
//!   leaving the edge table in storage.
//!
//! Both treat stored edges as undirected.

use crate::neo4j::models::CorpusEdge;
use crate::neo4j::GraphStore;
use anyhow::Result;
use async_trait::async_trait;
use petgraph::graph::{NodeIndex, UnGraph};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use uuid::Uuid;

/// A one-hop move from a frontier node to a neighbor.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Adjacent {
    /// Frontier node the move starts from
    pub from: Uuid,
    /// Neighbor reached
    pub to: Uuid,
    pub edge_id: Uuid,
    pub edge_type: String,
}

/// One-hop expansion of a set of nodes.
#[async_trait]
pub trait NeighborSource: Send + Sync {
    /// Every move from a node of `frontier` to one of its neighbors, in
    /// either edge direction. Order is unspecified.
    async fn expand(&self, frontier: &[Uuid]) -> Result<Vec<Adjacent>>;
}

/// Turn stored edges into moves leaving the frontier. An edge with both
/// endpoints in the frontier yields a move each way.
fn moves_from_edges(edges: &[CorpusEdge], frontier: &HashSet<Uuid>) -> Vec<Adjacent> {
    let mut out = Vec::new();
    for edge in edges {
        if frontier.contains(&edge.from_node_id) {
            out.push(Adjacent {
                from: edge.from_node_id,
                to: edge.to_node_id,
                edge_id: edge.id,
                edge_type: edge.edge_type.clone(),
            });
        }
        if frontier.contains(&edge.to_node_id) {
            out.push(Adjacent {
                from: edge.to_node_id,
                to: edge.from_node_id,
                edge_id: edge.id,
                edge_type: edge.edge_type.clone(),
            });
        }
    }
    out
}

// ============================================================================
// In-process backend
// ============================================================================

/// Edge payload kept on the petgraph edges
#[derive(Debug, Clone)]
struct EdgeLink {
    id: Uuid,
    edge_type: String,
}

/// Undirected snapshot of the corpus edge table.
///
/// Nodes without edges are absent; they have no neighbors anyway.
pub struct LoadedGraph {
    graph: UnGraph<Uuid, EdgeLink>,
    id_to_index: HashMap<Uuid, NodeIndex>,
}

impl LoadedGraph {
    /// Fetch every edge from the store and build the adjacency.
    pub async fn load(store: &dyn GraphStore) -> Result<Self> {
        let edges = store.list_edges(None).await?;
        Ok(Self::from_edges(&edges))
    }

    pub fn from_edges(edges: &[CorpusEdge]) -> Self {
        let mut loaded = Self {
            graph: UnGraph::with_capacity(edges.len(), edges.len()),
            id_to_index: HashMap::with_capacity(edges.len()),
        };
        for edge in edges {
            let a = loaded.index_of(edge.from_node_id);
            let b = loaded.index_of(edge.to_node_id);
            loaded.graph.add_edge(
                a,
                b,
                EdgeLink {
                    id: edge.id,
                    edge_type: edge.edge_type.clone(),
                },
            );
        }
        loaded
    }

    fn index_of(&mut self, id: Uuid) -> NodeIndex {
        if let Some(&idx) = self.id_to_index.get(&id) {
            return idx;
        }
        let idx = self.graph.add_node(id);
        self.id_to_index.insert(id, idx);
        idx
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

#[async_trait]
impl NeighborSource for LoadedGraph {
    async fn expand(&self, frontier: &[Uuid]) -> Result<Vec<Adjacent>> {
        use petgraph::visit::EdgeRef;

        let mut out = Vec::new();
        for id in frontier {
            let Some(&idx) = self.id_to_index.get(id) else {
                continue;
            };
            for edge in self.graph.edges(idx) {
                let other = if edge.source() == idx {
                    edge.target()
                } else {
                    edge.source()
                };
                out.push(Adjacent {
                    from: *id,
                    to: self.graph[other],
                    edge_id: edge.weight().id,
                    edge_type: edge.weight().edge_type.clone(),
                });
            }
        }
        Ok(out)
    }
}

// ============================================================================
// Storage pushdown backend
// ============================================================================

/// Expands each level with a single batched store query.
pub struct StoreFrontier {
    store: Arc<dyn GraphStore>,
}

impl StoreFrontier {
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl NeighborSource for StoreFrontier {
    async fn expand(&self, frontier: &[Uuid]) -> Result<Vec<Adjacent>> {
        if frontier.is_empty() {
            return Ok(vec![]);
        }
        let edges = self.store.get_incident_edges(frontier).await?;
        let wanted: HashSet<Uuid> = frontier.iter().copied().collect();
        Ok(moves_from_edges(&edges, &wanted))
    }
}
