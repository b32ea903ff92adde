//! API handlers for edges and the edge-type registry

use super::handlers::{AppError, CorpusState};
use super::query::EdgeTypeFilter;
use crate::corpus::{CreateEdgeRequest, RegisterEdgeTypeRequest, UpdateEdgeRequest};
use crate::neo4j::models::{CorpusEdge, EdgeTypeDefinition};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

/// List edges (`?edge_type=causes,part_of`)
pub async fn list_edges(
    State(state): State<CorpusState>,
    Query(filter): Query<EdgeTypeFilter>,
) -> Result<Json<Vec<CorpusEdge>>, AppError> {
    let types = filter.to_vec();
    let edges = state.corpus.list_edges(types.as_deref()).await?;
    Ok(Json(edges))
}

/// Create an edge (409 on duplicate)
pub async fn create_edge(
    State(state): State<CorpusState>,
    Json(req): Json<CreateEdgeRequest>,
) -> Result<(StatusCode, Json<CorpusEdge>), AppError> {
    let edge = state.corpus.create_edge(req).await?;
    Ok((StatusCode::CREATED, Json(edge)))
}

/// Get an edge
pub async fn get_edge(
    State(state): State<CorpusState>,
    Path(edge_id): Path<Uuid>,
) -> Result<Json<CorpusEdge>, AppError> {
    let edge = state
        .corpus
        .get_edge(edge_id)
        .await?
        .ok_or(AppError::NotFound(format!("Edge {} not found", edge_id)))?;
    Ok(Json(edge))
}

/// Update edge weight / description
pub async fn update_edge(
    State(state): State<CorpusState>,
    Path(edge_id): Path<Uuid>,
    Json(req): Json<UpdateEdgeRequest>,
) -> Result<Json<CorpusEdge>, AppError> {
    let edge = state.corpus.update_edge(edge_id, req).await?;
    Ok(Json(edge))
}

/// Delete an edge
pub async fn delete_edge(
    State(state): State<CorpusState>,
    Path(edge_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.corpus.delete_edge(edge_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Edge type registry
// ============================================================================

/// List registered edge types
pub async fn list_edge_types(
    State(state): State<CorpusState>,
) -> Result<Json<Vec<EdgeTypeDefinition>>, AppError> {
    Ok(Json(state.corpus.list_edge_types().await?))
}

/// Register (or relabel) an edge type
pub async fn register_edge_type(
    State(state): State<CorpusState>,
    Json(req): Json<RegisterEdgeTypeRequest>,
) -> Result<Json<EdgeTypeDefinition>, AppError> {
    let def = state.corpus.register_edge_type(req).await?;
    Ok(Json(def))
}
