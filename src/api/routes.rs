//! API route definitions

use super::{edge_handlers, graph_handlers, handlers, node_handlers, tag_handlers};
use super::handlers::CorpusState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the API router
pub fn create_router(state: CorpusState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(handlers::health))
        // ====================================================================
        // Nodes
        // ====================================================================
        .route(
            "/api/nodes",
            get(node_handlers::list_nodes).post(node_handlers::create_node),
        )
        .route(
            "/api/nodes/{id}",
            get(node_handlers::get_node)
                .patch(node_handlers::update_node)
                .delete(node_handlers::delete_node),
        )
        .route("/api/nodes/{id}/graph", get(node_handlers::get_node_graph))
        .route(
            "/api/nodes/{id}/suggestions",
            get(node_handlers::get_node_suggestions),
        )
        // Node tags
        .route(
            "/api/nodes/{id}/tags",
            get(node_handlers::get_node_tags).put(node_handlers::set_node_tags),
        )
        .route(
            "/api/nodes/{id}/tags/{tag_id}",
            post(node_handlers::add_node_tag).delete(node_handlers::remove_node_tag),
        )
        // ====================================================================
        // Edges
        // ====================================================================
        .route(
            "/api/edges",
            get(edge_handlers::list_edges).post(edge_handlers::create_edge),
        )
        .route(
            "/api/edges/{id}",
            get(edge_handlers::get_edge)
                .patch(edge_handlers::update_edge)
                .delete(edge_handlers::delete_edge),
        )
        .route(
            "/api/edge-types",
            get(edge_handlers::list_edge_types).post(edge_handlers::register_edge_type),
        )
        // ====================================================================
        // Tags
        // ====================================================================
        .route(
            "/api/tags",
            get(tag_handlers::list_tags).post(tag_handlers::create_tag),
        )
        .route(
            "/api/tags/{id}",
            get(tag_handlers::get_tag)
                .patch(tag_handlers::update_tag)
                .delete(tag_handlers::delete_tag),
        )
        // ====================================================================
        // Graph queries
        // ====================================================================
        .route("/api/graph/path", get(graph_handlers::find_path))
        .route("/api/graph/search", get(graph_handlers::search_graph))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
