//! Edge suggestion service
//!
//! Tag-overlap candidates are scored concurrently by the configured
//! `RelevanceScorer`; each call runs in its own spawned task and the whole
//! batch shares one deadline.

use super::candidates::TagOverlapGenerator;
use super::scorer::{RelevanceScore, RelevanceScorer, ScoringSubject};
use crate::neo4j::models::*;
use crate::neo4j::GraphStore;
use anyhow::Result;
use futures::future::{join_all, try_join_all};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Tuning knobs for the suggestion pipeline
#[derive(Debug, Clone)]
pub struct SuggestionConfig {
    /// Candidates kept after tag-overlap ranking (default: 10)
    pub max_candidates: usize,
    /// Candidates actually sent to the scorer (default: 5)
    pub max_scored: usize,
    /// Deadline for the whole scoring batch (default: 30s)
    pub timeout: Duration,
    /// Scores below this are dropped (default: 0.3)
    pub min_confidence: f64,
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            max_candidates: 10,
            max_scored: 5,
            timeout: Duration::from_secs(30),
            min_confidence: 0.3,
        }
    }
}

/// A proposed new edge from the source node
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EdgeSuggestion {
    pub target_node_id: Uuid,
    pub target_title: String,
    pub target_node_type: CorpusNodeType,
    pub confidence: f64,
    pub suggested_type: String,
    pub justification: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestionResponse {
    /// False when no scorer is configured
    pub available: bool,
    pub suggestions: Vec<EdgeSuggestion>,
}

impl SuggestionResponse {
    pub fn unavailable() -> Self {
        Self {
            available: false,
            suggestions: vec![],
        }
    }
}

/// Score up to `config.max_scored` targets concurrently against `source`.
///
/// `relation_types` is handed to every call as the set of edge types the
/// scorer may propose. Every call runs in its own task. If the batch misses `config.timeout`
/// the whole result is empty; tasks still running are detached and their
/// results dropped. A failing call only loses its own target. Survivors at
/// or above `config.min_confidence` come back best first.
pub async fn score_and_rank(
    scorer: Arc<dyn RelevanceScorer>,
    source: ScoringSubject,
    targets: Vec<ScoringSubject>,
    relation_types: Vec<String>,
    config: &SuggestionConfig,
) -> Vec<(ScoringSubject, RelevanceScore)> {
    let source = Arc::new(source);
    let relation_types: Arc<[String]> = relation_types.into();
    let handles: Vec<_> = targets
        .into_iter()
        .take(config.max_scored)
        .map(|target| {
            let scorer = scorer.clone();
            let source = source.clone();
            let relation_types = relation_types.clone();
            tokio::spawn(async move {
                let result = scorer.score(&source, &target, &relation_types).await;
                (target, result)
            })
        })
        .collect();

    let batch = handles.len();
    let results = match tokio::time::timeout(config.timeout, join_all(handles)).await {
        Ok(results) => results,
        Err(_) => {
            tracing::warn!(
                source_id = %source.id,
                batch,
                timeout = ?config.timeout,
                model = scorer.model_name(),
                "Relevance scoring timed out, discarding batch"
            );
            return vec![];
        }
    };

    let mut scored = Vec::with_capacity(results.len());
    for joined in results {
        match joined {
            Ok((target, Ok(score))) => {
                if score.score >= config.min_confidence {
                    scored.push((target, score));
                }
            }
            Ok((target, Err(e))) => {
                tracing::warn!(
                    source_id = %source.id,
                    target_id = %target.id,
                    error = %e,
                    "Relevance scoring failed"
                );
            }
            Err(e) => {
                tracing::warn!(source_id = %source.id, error = %e, "Scoring task aborted");
            }
        }
    }

    scored.sort_by(|a, b| b.1.score.total_cmp(&a.1.score));
    scored
}

/// Proposes new edges for a node
pub struct EdgeSuggestionService {
    neo4j: Arc<dyn GraphStore>,
    candidates: TagOverlapGenerator,
    scorer: Option<Arc<dyn RelevanceScorer>>,
    config: SuggestionConfig,
}

impl EdgeSuggestionService {
    pub fn new(
        neo4j: Arc<dyn GraphStore>,
        scorer: Option<Arc<dyn RelevanceScorer>>,
        config: SuggestionConfig,
    ) -> Self {
        Self {
            candidates: TagOverlapGenerator::new(neo4j.clone()),
            neo4j,
            scorer,
            config,
        }
    }

    pub fn is_available(&self) -> bool {
        self.scorer.is_some()
    }

    async fn subject(&self, node: &CorpusNode) -> Result<ScoringSubject> {
        let tags = self
            .neo4j
            .get_node_tags(node.id)
            .await?
            .into_iter()
            .map(|t| t.name)
            .collect();
        Ok(ScoringSubject::from_node(node, tags))
    }

    /// Suggested edges for `node_id`.
    ///
    /// Unknown node → `CorpusError::NodeNotFound`. No scorer → `available: false`.
    pub async fn suggest_related_nodes(&self, node_id: Uuid) -> Result<SuggestionResponse> {
        let source = self
            .neo4j
            .get_node(node_id)
            .await?
            .ok_or(CorpusError::NodeNotFound(node_id))?;

        let Some(scorer) = self.scorer.clone() else {
            return Ok(SuggestionResponse::unavailable());
        };

        let candidates = self
            .candidates
            .find_candidates(node_id, self.config.max_candidates)
            .await?;
        if candidates.is_empty() {
            return Ok(SuggestionResponse {
                available: true,
                suggestions: vec![],
            });
        }

        // Keep candidate order: only the best `max_scored` get scored
        let ids: Vec<Uuid> = candidates
            .iter()
            .take(self.config.max_scored)
            .map(|c| c.node_id)
            .collect();
        let mut nodes: HashMap<Uuid, CorpusNode> = self
            .neo4j
            .get_nodes(&ids)
            .await?
            .into_iter()
            .map(|n| (n.id, n))
            .collect();
        let ordered: Vec<CorpusNode> = ids.iter().filter_map(|id| nodes.remove(id)).collect();

        // Registry is read per request so newly registered types are offered
        let (source, targets, edge_types) = tokio::try_join!(
            self.subject(&source),
            try_join_all(ordered.iter().map(|node| self.subject(node))),
            self.neo4j.list_edge_types(),
        )?;
        let relation_types: Vec<String> = edge_types.into_iter().map(|t| t.key).collect();
        let known_types: HashSet<&str> = relation_types.iter().map(String::as_str).collect();

        let suggestions = score_and_rank(
            scorer,
            source,
            targets,
            relation_types.clone(),
            &self.config,
        )
        .await
        .into_iter()
        .map(|(target, score)| {
            let suggested_type = if known_types.contains(score.suggested_type.as_str()) {
                score.suggested_type
            } else {
                GENERIC_EDGE_TYPE.to_string()
            };
            EdgeSuggestion {
                target_node_id: target.id,
                target_title: target.title,
                target_node_type: target.node_type,
                confidence: score.score,
                suggested_type,
                justification: score.reason,
            }
        })
        .collect::<Vec<_>>();

        tracing::info!(
            node_id = %node_id,
            candidates = candidates.len(),
            suggestions = suggestions.len(),
            "Computed edge suggestions"
        );

        Ok(SuggestionResponse {
            available: true,
            suggestions,
        })
    }
}
