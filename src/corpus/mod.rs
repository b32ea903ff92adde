//! Corpus management: CRUD over nodes, edges, edge types and tags

pub mod manager;
pub mod models;

pub use manager::CorpusManager;
pub use models::*;
