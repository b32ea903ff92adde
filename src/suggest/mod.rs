//! Edge suggestions: tag-overlap candidates scored by an LLM.
//!
//! ```text
//! TagOverlapGenerator ──► candidates ──► score_and_rank (spawned tasks, one deadline)
//!                                               │
//!                                        RelevanceScorer (HTTP | mock)
//! ```

pub mod candidates;
pub mod llm;
pub mod scorer;
pub mod service;

#[cfg(test)]
pub mod mock;

pub use candidates::{Candidate, TagOverlapGenerator, DIRECT_TAG_WEIGHT, PARENT_TAG_WEIGHT};
pub use llm::HttpRelevanceScorer;
pub use scorer::{RelevanceScore, RelevanceScorer, ScoringSubject};
pub use service::{
    score_and_rank, EdgeSuggestion, EdgeSuggestionService, SuggestionConfig, SuggestionResponse,
};
