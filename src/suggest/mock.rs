//! Scripted relevance scorer for tests.
//!
//! Behavior is chosen per target title; unscripted targets get the default
//! score.

use super::scorer::{RelevanceScore, RelevanceScorer, ScoringSubject};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum MockBehavior {
    Score { score: f64, suggested_type: String },
    Fail(String),
    /// Sleep, then score
    Delay { delay: Duration, score: f64 },
}

pub struct MockRelevanceScorer {
    default_score: f64,
    behaviors: HashMap<String, MockBehavior>,
    calls: AtomicUsize,
    /// Relation types and target tags seen on the last call
    last_call: Mutex<Option<(Vec<String>, Vec<String>)>>,
}

impl MockRelevanceScorer {
    pub fn new(default_score: f64) -> Self {
        Self {
            default_score,
            behaviors: HashMap::new(),
            calls: AtomicUsize::new(0),
            last_call: Mutex::new(None),
        }
    }

    pub fn with_score(mut self, title: &str, score: f64, suggested_type: &str) -> Self {
        self.behaviors.insert(
            title.to_string(),
            MockBehavior::Score {
                score,
                suggested_type: suggested_type.to_string(),
            },
        );
        self
    }

    pub fn failing(mut self, title: &str) -> Self {
        self.behaviors.insert(
            title.to_string(),
            MockBehavior::Fail(format!("scripted failure for {}", title)),
        );
        self
    }

    pub fn delayed(mut self, title: &str, delay: Duration, score: f64) -> Self {
        self.behaviors
            .insert(title.to_string(), MockBehavior::Delay { delay, score });
        self
    }

    /// Number of `score` calls started so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// `(relation_types, target tags)` passed to the most recent call
    pub fn last_call(&self) -> Option<(Vec<String>, Vec<String>)> {
        self.last_call.lock().ok().and_then(|guard| guard.clone())
    }
}

#[async_trait]
impl RelevanceScorer for MockRelevanceScorer {
    async fn score(
        &self,
        _source: &ScoringSubject,
        target: &ScoringSubject,
        relation_types: &[String],
    ) -> Result<RelevanceScore> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_call.lock() {
            *last = Some((relation_types.to_vec(), target.tags.clone()));
        }
        let (score, suggested_type) = match self.behaviors.get(&target.title) {
            None => (self.default_score, "relates_to".to_string()),
            Some(MockBehavior::Score {
                score,
                suggested_type,
            }) => (*score, suggested_type.clone()),
            Some(MockBehavior::Fail(msg)) => anyhow::bail!("{}", msg),
            Some(MockBehavior::Delay { delay, score }) => {
                tokio::time::sleep(*delay).await;
                (*score, "relates_to".to_string())
            }
        };
        Ok(RelevanceScore {
            score,
            suggested_type,
            reason: format!("mock verdict for {}", target.title),
        })
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}
