//! Test helper factories and mock state builders
//!
//! Provides convenience functions for creating corpus objects with sensible
//! defaults, and for building a `ServerState` over in-memory backends.
#![allow(dead_code)]

use crate::api::handlers::{CorpusState, ServerState};
use crate::corpus::CorpusManager;
use crate::neo4j::mock::MockGraphStore;
use crate::neo4j::models::*;
use crate::neo4j::GraphStore;
use crate::suggest::{EdgeSuggestionService, RelevanceScorer, SuggestionConfig};
use crate::traversal::{TraversalBackend, TraversalEngine};
use std::sync::Arc;
use uuid::Uuid;

// ============================================================================
// Mock state builders
// ============================================================================

/// Server state over an empty mock store, without a relevance scorer
pub fn mock_server_state() -> CorpusState {
    mock_server_state_with(MockGraphStore::new(), None)
}

/// Server state over a pre-seeded mock store and an optional scorer
pub fn mock_server_state_with(
    store: MockGraphStore,
    scorer: Option<Arc<dyn RelevanceScorer>>,
) -> CorpusState {
    let neo4j: Arc<dyn GraphStore> = Arc::new(store);
    Arc::new(ServerState {
        corpus: Arc::new(CorpusManager::new(neo4j.clone())),
        traversal: Arc::new(TraversalEngine::new(
            neo4j.clone(),
            TraversalBackend::default(),
        )),
        suggestions: Arc::new(EdgeSuggestionService::new(
            neo4j.clone(),
            scorer,
            SuggestionConfig::default(),
        )),
        neo4j,
    })
}

// ============================================================================
// Entity factories
// ============================================================================

/// A dossier node with the given title
pub fn test_node(title: &str) -> CorpusNode {
    test_node_of(CorpusNodeType::Dossier, title)
}

pub fn test_node_of(node_type: CorpusNodeType, title: &str) -> CorpusNode {
    CorpusNode::new(node_type, title.to_string(), None)
}

pub fn test_edge(from: Uuid, to: Uuid, edge_type: &str) -> CorpusEdge {
    CorpusEdge::new(from, to, edge_type.to_string())
}

pub fn test_tag(name: &str, parent_id: Option<Uuid>) -> Tag {
    Tag::new(name.to_string(), parent_id, None)
}
