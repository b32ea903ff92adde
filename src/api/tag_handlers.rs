//! API handlers for tags

use super::handlers::{AppError, CorpusState};
use crate::corpus::{CreateTagRequest, UpdateTagRequest};
use crate::neo4j::models::Tag;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

pub async fn list_tags(State(state): State<CorpusState>) -> Result<Json<Vec<Tag>>, AppError> {
    Ok(Json(state.corpus.list_tags().await?))
}

pub async fn create_tag(
    State(state): State<CorpusState>,
    Json(req): Json<CreateTagRequest>,
) -> Result<(StatusCode, Json<Tag>), AppError> {
    let tag = state.corpus.create_tag(req).await?;
    Ok((StatusCode::CREATED, Json(tag)))
}

pub async fn get_tag(
    State(state): State<CorpusState>,
    Path(tag_id): Path<Uuid>,
) -> Result<Json<Tag>, AppError> {
    let tag = state
        .corpus
        .get_tag(tag_id)
        .await?
        .ok_or(AppError::NotFound(format!("Tag {} not found", tag_id)))?;
    Ok(Json(tag))
}

/// Rename, re-parent (`"parent_id": null` detaches) or describe a tag
pub async fn update_tag(
    State(state): State<CorpusState>,
    Path(tag_id): Path<Uuid>,
    Json(req): Json<UpdateTagRequest>,
) -> Result<Json<Tag>, AppError> {
    let tag = state.corpus.update_tag(tag_id, req).await?;
    Ok(Json(tag))
}

/// Delete a tag; its children become root tags
pub async fn delete_tag(
    State(state): State<CorpusState>,
    Path(tag_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.corpus.delete_tag(tag_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
