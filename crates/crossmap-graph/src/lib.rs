//! Typed Heterogeneous Graph for CrossMap
//!
//! Holds nodes partitioned by type and weighted edges partitioned by
//! (source type, destination type), all in per-type local key space, and
//! converts single relations into dense adjacency matrices.
//!
//! # Architecture
//!
//! - **model**: `TypedGraph`, `NodeTable`, sparse `EdgeRelation`
//! - **adjacency**: dense matrix construction and row normalization
//! - **derive**: matrix powers and thresholded re-extraction of derived relations
//! - **config**: configurable list of derived relations
//! - **error**: `GraphError`
//!
//! # Example
//!
//! ```
//! use crossmap_core::{EdgeType, InMemorySource, NodeType};
//! use crossmap_graph::{GraphResult, TypedGraph};
//!
//! fn example() -> GraphResult<()> {
//!     let tw = EdgeType::new(NodeType::Tweet, NodeType::Word);
//!     let mut source = InMemorySource::new();
//!     source
//!         .add_node(0, NodeType::Tweet, 0, "first tweet")
//!         .add_node(1, NodeType::Word, 0, "beach")
//!         .add_edge(tw, 0, 1, 5.0);
//!
//!     let graph = TypedGraph::from_source(&source)?;
//!     let matrix = graph.build_matrix(tw)?;
//!     assert_eq!(matrix[[0, 0]], 5.0);
//!     Ok(())
//! }
//! # example().unwrap();
//! ```

pub mod adjacency;
pub mod config;
pub mod derive;
pub mod error;
pub mod model;

pub use adjacency::row_normalize;
pub use config::{DerivationSpec, GraphConfig, Normalization};
pub use derive::{matrix_power, DERIVATION_THRESHOLD};
pub use error::{GraphError, GraphResult};
pub use model::{has_line_break_or_tab, relation_len, EdgeRelation, NodeTable, TypedGraph};
