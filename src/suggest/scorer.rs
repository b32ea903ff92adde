//! RelevanceScorer trait definition
//!
//! Same shape as `GraphStore`: async trait + Send + Sync so a single
//! `Arc<dyn RelevanceScorer>` can be cloned into every spawned scoring task.

use crate::neo4j::models::{CorpusNode, CorpusNodeType};
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What the scorer gets to see about a node
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoringSubject {
    pub id: Uuid,
    pub title: String,
    pub node_type: CorpusNodeType,
    pub description: Option<String>,
    /// Names of the node's direct tags
    #[serde(default)]
    pub tags: Vec<String>,
}

impl ScoringSubject {
    pub fn from_node(node: &CorpusNode, tags: Vec<String>) -> Self {
        Self {
            id: node.id,
            title: node.title.clone(),
            node_type: node.node_type,
            description: node.description.clone(),
            tags,
        }
    }
}

/// Scorer verdict for one (source, target) pair
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RelevanceScore {
    /// Confidence in [0, 1]
    pub score: f64,
    /// Edge-type key proposed for the new relation
    pub suggested_type: String,
    /// Short human-readable justification
    pub reason: String,
}

/// Judges how strongly two corpus nodes are related.
///
/// # Implementations
///
/// - [`HttpRelevanceScorer`](super::HttpRelevanceScorer): any OpenAI-compatible
///   `/v1/chat/completions` endpoint
/// - `MockRelevanceScorer`: scripted scores, failures and delays (tests only)
#[async_trait]
pub trait RelevanceScorer: Send + Sync {
    /// Score the relevance of `target` to `source`.
    ///
    /// `relation_types` are the edge-type keys currently registered; the
    /// scorer should pick `suggested_type` from them.
    ///
    /// # Errors
    ///
    /// Network failures, non-2xx responses and unparseable model output.
    async fn score(
        &self,
        source: &ScoringSubject,
        target: &ScoringSubject,
        relation_types: &[String],
    ) -> Result<RelevanceScore>;

    /// Model identifier, for logs
    fn model_name(&self) -> &str;
}
