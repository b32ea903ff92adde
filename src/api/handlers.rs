//! Shared API state, error mapping and health check

use crate::corpus::CorpusManager;
use crate::neo4j::models::CorpusError;
use crate::neo4j::GraphStore;
use crate::suggest::EdgeSuggestionService;
use crate::traversal::TraversalEngine;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;

/// Shared server state
pub struct ServerState {
    pub neo4j: Arc<dyn GraphStore>,
    pub corpus: Arc<CorpusManager>,
    pub traversal: Arc<TraversalEngine>,
    pub suggestions: Arc<EdgeSuggestionService>,
}

/// Shared corpus state
pub type CorpusState = Arc<ServerState>;

// ============================================================================
// Health
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub neo4j: bool,
    pub suggestions_available: bool,
    pub traversal_backend: String,
    pub version: String,
}

/// Health check
pub async fn health(State(state): State<CorpusState>) -> (StatusCode, Json<HealthResponse>) {
    let neo4j_ok = state.neo4j.health_check().await.unwrap_or(false);

    let http_status = if neo4j_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        http_status,
        Json(HealthResponse {
            status: if neo4j_ok { "ok" } else { "unhealthy" }.to_string(),
            neo4j: neo4j_ok,
            suggestions_available: state.suggestions.is_available(),
            traversal_backend: state.traversal.backend().to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

// ============================================================================
// Error handling
// ============================================================================

/// API error type
#[derive(Debug)]
pub enum AppError {
    Internal(anyhow::Error),
    NotFound(String),
    BadRequest(String),
    Conflict(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::Internal(e) => {
                tracing::error!(error = %e, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast_ref::<CorpusError>() {
            Some(domain) => {
                let message = domain.to_string();
                match domain {
                    CorpusError::NodeNotFound(_)
                    | CorpusError::EdgeNotFound(_)
                    | CorpusError::TagNotFound(_) => AppError::NotFound(message),
                    CorpusError::DuplicateEdge { .. } | CorpusError::DuplicateTag(_) => {
                        AppError::Conflict(message)
                    }
                    CorpusError::UnknownEdgeType(_)
                    | CorpusError::SelfLoop(_)
                    | CorpusError::TagCycle { .. }
                    | CorpusError::InvalidInput(_) => AppError::BadRequest(message),
                }
            }
            None => AppError::Internal(err),
        }
    }
}
