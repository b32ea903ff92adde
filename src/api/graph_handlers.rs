//! API handlers for path finding and filtered graph views

use super::handlers::{AppError, CorpusState};
use super::query::{GraphSearchFilter, PathQuery};
use crate::traversal::{GraphView, PathStep};
use axum::{
    extract::{Query, State},
    Json,
};
use serde::Serialize;

#[derive(Serialize)]
pub struct PathResponse {
    pub found: bool,
    /// Number of edges on the path
    pub hops: usize,
    pub path: Vec<PathStep>,
}

/// Shortest path between two nodes (`?from_id=&to_id=&max_depth=1..50`)
pub async fn find_path(
    State(state): State<CorpusState>,
    Query(query): Query<PathQuery>,
) -> Result<Json<PathResponse>, AppError> {
    let max_depth = query.max_depth().map_err(AppError::BadRequest)?;
    let path = state
        .traversal
        .find_shortest_path(query.from_id, query.to_id, max_depth)
        .await?;

    Ok(Json(PathResponse {
        found: !path.is_empty(),
        hops: path.len().saturating_sub(1),
        path,
    }))
}

/// Whole graph filtered by node and edge types
/// (`?node_types=dossier&node_types=goal&edge_types=causes`)
pub async fn search_graph(
    State(state): State<CorpusState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<GraphView>, AppError> {
    let filter = GraphSearchFilter::from_pairs(&pairs).map_err(AppError::BadRequest)?;
    let view = state
        .traversal
        .get_filtered_graph(filter.node_types.as_deref(), filter.edge_types.as_deref())
        .await?;
    Ok(Json(view))
}
