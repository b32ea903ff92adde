//! HTTP relevance scorer
//!
//! Implements `RelevanceScorer` on top of any OpenAI-compatible
//! `/v1/chat/completions` endpoint (Ollama, OpenAI, LiteLLM, vLLM...).
//!
//! The model is asked to answer with a single JSON object:
//! `{"score": 0.0-1.0, "relation_type": "<edge type key>", "reason": "..."}`.
//! Markdown code fences and surrounding prose are tolerated.

use super::scorer::{RelevanceScore, RelevanceScorer, ScoringSubject};
use crate::neo4j::models::{default_edge_types, GENERIC_EDGE_TYPE};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_LLM_URL: &str = "http://localhost:11434/v1/chat/completions";
pub const DEFAULT_LLM_MODEL: &str = "llama3.1";

/// Per-request HTTP timeout; the suggestion service applies its own overall deadline.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Chat-completions based relevance scorer.
///
/// Cheaply cloneable (shares the reqwest client internally).
#[derive(Clone)]
pub struct HttpRelevanceScorer {
    client: reqwest::Client,
    url: String,
    model: String,
    api_key: Option<String>,
}

#[derive(Debug, Serialize)]
struct ChatCompletionsRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionsResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// OpenAI-compatible error response
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Payload the model is asked to produce
#[derive(Debug, Deserialize)]
struct ScorePayload {
    score: f64,
    #[serde(default)]
    relation_type: Option<String>,
    #[serde(default)]
    reason: Option<String>,
}

impl HttpRelevanceScorer {
    /// Create a scorer for the given endpoint and model.
    pub fn new(url: String, model: String, api_key: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            url,
            model,
            api_key,
        })
    }

    /// Falls back to the seeded registry when `relation_types` is empty.
    fn system_prompt(relation_types: &[String]) -> String {
        let offered: Vec<String> = if relation_types.is_empty() {
            default_edge_types().into_iter().map(|d| d.key).collect()
        } else {
            relation_types.to_vec()
        };
        format!(
            "You assess relations between entities of a government policy corpus. \
             Given a source and a target entity, rate how relevant a direct relation \
             between them would be. Answer with one JSON object and nothing else: \
             {{\"score\": <number between 0 and 1>, \"relation_type\": <one of {}>, \
             \"reason\": <one sentence>}}.",
            offered.join(", ")
        )
    }

    fn describe(subject: &ScoringSubject) -> String {
        let mut text = format!("[{}] {}", subject.node_type, subject.title);
        if let Some(ref description) = subject.description {
            text.push_str("\nDescription: ");
            text.push_str(description);
        }
        if !subject.tags.is_empty() {
            text.push_str("\nTags: ");
            text.push_str(&subject.tags.join(", "));
        }
        text
    }

    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String> {
        let body = ChatCompletionsRequest {
            model: self.model.clone(),
            messages,
            temperature: 0.0,
        };

        let mut req = self.client.post(&self.url).json(&body);
        if let Some(ref key) = self.api_key {
            req = req.header("Authorization", format!("Bearer {}", key));
        }

        let response = req
            .send()
            .await
            .with_context(|| format!("Failed to connect to LLM API at {}", self.url))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if let Ok(err) = serde_json::from_str::<ErrorResponse>(&body) {
                if let Some(detail) = err.error {
                    anyhow::bail!("LLM API error ({}): {}", status.as_u16(), detail.message);
                }
            }
            anyhow::bail!("LLM API returned {}: {}", status.as_u16(), body);
        }

        let resp: ChatCompletionsResponse = response
            .json()
            .await
            .context("Failed to parse LLM API response")?;

        resp.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .context("LLM API returned no choices")
    }
}

/// Extract the score object from model output.
fn parse_score(content: &str) -> Result<RelevanceScore> {
    let start = content
        .find('{')
        .context("No JSON object in model output")?;
    let end = content
        .rfind('}')
        .filter(|end| *end > start)
        .context("Unterminated JSON object in model output")?;

    let payload: ScorePayload = serde_json::from_str(&content[start..=end])
        .context("Model output is not a valid score object")?;

    if !payload.score.is_finite() {
        anyhow::bail!("Model returned a non-finite score");
    }

    Ok(RelevanceScore {
        score: payload.score.clamp(0.0, 1.0),
        suggested_type: payload
            .relation_type
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| GENERIC_EDGE_TYPE.to_string()),
        reason: payload.reason.unwrap_or_default(),
    })
}

#[async_trait]
impl RelevanceScorer for HttpRelevanceScorer {
    async fn score(
        &self,
        source: &ScoringSubject,
        target: &ScoringSubject,
        relation_types: &[String],
    ) -> Result<RelevanceScore> {
        let messages = vec![
            ChatMessage {
                role: "system".into(),
                content: Self::system_prompt(relation_types),
            },
            ChatMessage {
                role: "user".into(),
                content: format!(
                    "Source:\n{}\n\nTarget:\n{}",
                    Self::describe(source),
                    Self::describe(target)
                ),
            },
        ];

        let content = self.complete(messages).await?;
        parse_score(&content)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
