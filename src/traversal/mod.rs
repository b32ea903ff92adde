//! Graph traversal over the policy corpus.
//!
//! ## Architecture
//!
//! ```text
//! GraphStore ──► NeighborSource (StoreFrontier | LoadedGraph)
//!                       │
//!                      bfs (shortest_path, reachable)
//!                       │
//!               TraversalEngine ──► PathStep / GraphView
//! ```
//!
//! ## Modules
//!
//! - [`models`]: `PathStep`, `GraphView`, `TraversalBackend`, depth limits
//! - [`source`]: one-hop expansion backends
//! - [`bfs`]: the breadth-first walk, written once for both backends
//! - [`engine`]: `TraversalEngine`, resolving node ids into results

pub mod bfs;
pub mod engine;
pub mod models;
pub mod source;

pub use engine::TraversalEngine;
pub use models::{
    check_depth, GraphView, PathStep, TraversalBackend, DEFAULT_PATH_MAX_DEPTH,
    DEFAULT_SUBGRAPH_DEPTH, MAX_PATH_DEPTH, MAX_SUBGRAPH_DEPTH,
};
