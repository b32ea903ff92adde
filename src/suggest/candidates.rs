//! Tag-overlap candidate generation.
//!
//! The source node's direct tags are expanded by one level of parents.
//! Every other node carrying one of the expanded tags becomes a candidate,
//! scored by how it overlaps:
//!
//! - shared direct tag: +1.0
//! - shared tag reached only through parent expansion: +0.7

use crate::neo4j::GraphStore;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use uuid::Uuid;

pub const DIRECT_TAG_WEIGHT: f64 = 1.0;
pub const PARENT_TAG_WEIGHT: f64 = 0.7;

/// A node worth asking the scorer about
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub node_id: Uuid,
    pub score: f64,
}

pub struct TagOverlapGenerator {
    store: Arc<dyn GraphStore>,
}

impl TagOverlapGenerator {
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self { store }
    }

    /// Candidates for `source_id`, best first, at most `max_candidates`.
    ///
    /// A source without tags (or an unknown source) has no candidates.
    pub async fn find_candidates(
        &self,
        source_id: Uuid,
        max_candidates: usize,
    ) -> Result<Vec<Candidate>> {
        let direct_tags = self.store.get_node_tags(source_id).await?;
        if direct_tags.is_empty() {
            return Ok(vec![]);
        }

        let direct: HashSet<Uuid> = direct_tags.iter().map(|t| t.id).collect();
        // A parent that is also a direct tag counts as direct
        let parent_only: HashSet<Uuid> = direct_tags
            .iter()
            .filter_map(|t| t.parent_id)
            .filter(|p| !direct.contains(p))
            .collect();

        let expanded: Vec<Uuid> = direct.iter().chain(parent_only.iter()).copied().collect();
        let links: HashSet<(Uuid, Uuid)> = self
            .store
            .get_nodes_with_any_tag(&expanded)
            .await?
            .into_iter()
            .collect();

        let mut scores: HashMap<Uuid, f64> = HashMap::new();
        for (node_id, tag_id) in links {
            if node_id == source_id {
                continue;
            }
            let weight = if direct.contains(&tag_id) {
                DIRECT_TAG_WEIGHT
            } else if parent_only.contains(&tag_id) {
                PARENT_TAG_WEIGHT
            } else {
                continue;
            };
            *scores.entry(node_id).or_default() += weight;
        }

        let mut candidates: Vec<Candidate> = scores
            .into_iter()
            .map(|(node_id, score)| Candidate { node_id, score })
            .collect();
        candidates.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.node_id.cmp(&b.node_id)));
        candidates.truncate(max_candidates);

        tracing::debug!(
            source_id = %source_id,
            direct_tags = direct.len(),
            parent_tags = parent_only.len(),
            candidates = candidates.len(),
            "Generated tag-overlap candidates"
        );
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::neo4j::mock::MockGraphStore;
    use crate::neo4j::models::Tag;
    use crate::test_helpers::test_node;

    fn score_of(candidates: &[Candidate], id: Uuid) -> Option<f64> {
        candidates.iter().find(|c| c.node_id == id).map(|c| c.score)
    }

    #[tokio::test]
    async fn test_direct_and_parent_overlap() {
        let security = Tag::new("security".into(), None, None);
        let privacy = Tag::new("privacy".into(), Some(security.id), None);
        let a = test_node("A");
        let b = test_node("B");
        let c = test_node("C");
        let store = MockGraphStore::new()
            .with_tag(security.clone())
            .await
            .with_tag(privacy.clone())
            .await
            .with_node_tag(a.id, privacy.id)
            .await
            .with_node_tag(b.id, privacy.id)
            .await
            .with_node_tag(c.id, security.id)
            .await;

        let candidates = TagOverlapGenerator::new(Arc::new(store))
            .find_candidates(a.id, 10)
            .await
            .unwrap();

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].node_id, b.id);
        assert_eq!(score_of(&candidates, b.id), Some(1.0));
        assert_eq!(score_of(&candidates, c.id), Some(0.7));
        assert_eq!(score_of(&candidates, a.id), None);
    }

    #[tokio::test]
    async fn test_scores_add_up() {
        let security = Tag::new("security".into(), None, None);
        let privacy = Tag::new("privacy".into(), Some(security.id), None);
        let source = test_node("S");
        let both = test_node("Both");
        let store = MockGraphStore::new()
            .with_tag(security.clone())
            .await
            .with_tag(privacy.clone())
            .await
            .with_node_tag(source.id, privacy.id)
            .await
            .with_node_tag(both.id, privacy.id)
            .await
            .with_node_tag(both.id, security.id)
            .await;

        let candidates = TagOverlapGenerator::new(Arc::new(store))
            .find_candidates(source.id, 10)
            .await
            .unwrap();
        assert_eq!(candidates.len(), 1);
        assert!((candidates[0].score - 1.7).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_parent_that_is_also_direct_counts_once_as_direct() {
        let security = Tag::new("security".into(), None, None);
        let privacy = Tag::new("privacy".into(), Some(security.id), None);
        let source = test_node("S");
        let other = test_node("O");
        let store = MockGraphStore::new()
            .with_tag(security.clone())
            .await
            .with_tag(privacy.clone())
            .await
            .with_node_tag(source.id, privacy.id)
            .await
            .with_node_tag(source.id, security.id)
            .await
            .with_node_tag(other.id, security.id)
            .await;

        let candidates = TagOverlapGenerator::new(Arc::new(store))
            .find_candidates(source.id, 10)
            .await
            .unwrap();
        assert_eq!(score_of(&candidates, other.id), Some(1.0));
    }

    #[tokio::test]
    async fn test_untagged_source_and_truncation() {
        let tag = Tag::new("energy".into(), None, None);
        let source = test_node("S");
        let mut store = MockGraphStore::new()
            .with_tag(tag.clone())
            .await
            .with_node_tag(source.id, tag.id)
            .await;
        for i in 0..15 {
            store = store.with_node_tag(test_node(&format!("N{i}")).id, tag.id).await;
        }
        let generator = TagOverlapGenerator::new(Arc::new(store));

        let candidates = generator.find_candidates(source.id, 10).await.unwrap();
        assert_eq!(candidates.len(), 10);
        // Equal scores are ordered by id
        assert!(candidates.windows(2).all(|w| w[0].node_id < w[1].node_id));

        assert!(generator
            .find_candidates(Uuid::new_v4(), 10)
            .await
            .unwrap()
            .is_empty());
    }
}
