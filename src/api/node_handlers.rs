//! API handlers for corpus nodes and their tags

use super::handlers::{AppError, CorpusState};
use super::query::{DepthQuery, NodeTypeFilter};
use crate::corpus::{CreateNodeRequest, SetNodeTagsRequest, UpdateNodeRequest};
use crate::neo4j::models::{CorpusNode, Tag};
use crate::suggest::SuggestionResponse;
use crate::traversal::GraphView;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

/// List nodes (`?node_type=dossier,goal`)
pub async fn list_nodes(
    State(state): State<CorpusState>,
    Query(filter): Query<NodeTypeFilter>,
) -> Result<Json<Vec<CorpusNode>>, AppError> {
    let types = filter.to_vec().map_err(AppError::BadRequest)?;
    let nodes = state.corpus.list_nodes(types.as_deref()).await?;
    Ok(Json(nodes))
}

/// Create a node
pub async fn create_node(
    State(state): State<CorpusState>,
    Json(req): Json<CreateNodeRequest>,
) -> Result<(StatusCode, Json<CorpusNode>), AppError> {
    let node = state.corpus.create_node(req).await?;
    Ok((StatusCode::CREATED, Json(node)))
}

/// Get a node
pub async fn get_node(
    State(state): State<CorpusState>,
    Path(node_id): Path<Uuid>,
) -> Result<Json<CorpusNode>, AppError> {
    let node = state
        .corpus
        .get_node(node_id)
        .await?
        .ok_or(AppError::NotFound(format!("Node {} not found", node_id)))?;
    Ok(Json(node))
}

/// Partially update a node
pub async fn update_node(
    State(state): State<CorpusState>,
    Path(node_id): Path<Uuid>,
    Json(req): Json<UpdateNodeRequest>,
) -> Result<Json<CorpusNode>, AppError> {
    let node = state.corpus.update_node(node_id, req).await?;
    Ok(Json(node))
}

/// Delete a node with its edges and tag links
pub async fn delete_node(
    State(state): State<CorpusState>,
    Path(node_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.corpus.delete_node(node_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Subgraph around a node (`?depth=1..5`, default 2)
pub async fn get_node_graph(
    State(state): State<CorpusState>,
    Path(node_id): Path<Uuid>,
    Query(query): Query<DepthQuery>,
) -> Result<Json<GraphView>, AppError> {
    let depth = query.depth().map_err(AppError::BadRequest)?;
    let view = state.traversal.get_subgraph(node_id, depth).await?;
    Ok(Json(view))
}

/// LLM-backed edge suggestions for a node
pub async fn get_node_suggestions(
    State(state): State<CorpusState>,
    Path(node_id): Path<Uuid>,
) -> Result<Json<SuggestionResponse>, AppError> {
    let response = state.suggestions.suggest_related_nodes(node_id).await?;
    Ok(Json(response))
}

// ============================================================================
// Node tags
// ============================================================================

/// Tags attached to a node
pub async fn get_node_tags(
    State(state): State<CorpusState>,
    Path(node_id): Path<Uuid>,
) -> Result<Json<Vec<Tag>>, AppError> {
    let tags = state.corpus.get_node_tags(node_id).await?;
    Ok(Json(tags))
}

/// Replace a node's tags
pub async fn set_node_tags(
    State(state): State<CorpusState>,
    Path(node_id): Path<Uuid>,
    Json(req): Json<SetNodeTagsRequest>,
) -> Result<Json<Vec<Tag>>, AppError> {
    let tags = state.corpus.set_node_tags(node_id, req.tag_ids).await?;
    Ok(Json(tags))
}

/// Attach one tag
pub async fn add_node_tag(
    State(state): State<CorpusState>,
    Path((node_id, tag_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    state.corpus.add_node_tag(node_id, tag_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Detach one tag
pub async fn remove_node_tag(
    State(state): State<CorpusState>,
    Path((node_id, tag_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    state.corpus.remove_node_tag(node_id, tag_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
