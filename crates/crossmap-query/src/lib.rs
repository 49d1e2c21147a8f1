//! CrossMap Nearest-Neighbor Queries
//!
//! Loads a node dictionary and an embedding table produced by a previous
//! training run and answers top-K cosine similarity queries restricted to one
//! node type.
//!
//! # Architecture
//!
//! - **dictionary**: `NodeDictionary` (value → id, candidates per type)
//! - **table**: `EmbeddingTable` with placeholder rows
//! - **engine**: `QueryEngine::neighbors`, `cosine_similarity`
//! - **export**: write a `VectorStore` back out in the loadable formats
//! - **config**: `QueryConfig`
//! - **error**: `QueryError`
//!
//! # Placeholder rows
//!
//! A global id with no line in the embedding file still gets a row, filled
//! with values drawn uniformly from `[0, 1)`. Queries touching such rows
//! succeed but their similarities are noise. Set
//! `QueryConfig::placeholder_seed` to make the noise reproducible.

pub mod config;
pub mod dictionary;
pub mod engine;
pub mod error;
pub mod export;
pub mod table;

pub use config::QueryConfig;
pub use dictionary::NodeDictionary;
pub use engine::{cosine_similarity, Neighbor, QueryEngine};
pub use error::{QueryError, QueryResult};
pub use export::{export_vectors, ExportSummary};
pub use table::EmbeddingTable;
