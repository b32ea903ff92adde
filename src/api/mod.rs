//! HTTP API for the policy corpus

pub mod edge_handlers;
pub mod graph_handlers;
pub mod handlers;
pub mod node_handlers;
pub mod query;
pub mod routes;
pub mod tag_handlers;

pub use routes::create_router;
