//! CrossMap core types.
//!
//! Shared vocabulary for the CrossMap workspace: the node/edge type algebra,
//! the tagged local key space, job identifiers, the dataset loader seam and the
//! error taxonomy every other crate classifies into.
//!
//! # Architecture
//!
//! - **types**: `NodeType`, `EdgeType`, `LocalKey`, `NodeId`, `JobId`
//! - **source**: `GraphSource` trait, `InMemorySource`, node dictionary records
//! - **error**: `CoreError` and the shared `ErrorCategory`
//!
//! # Example
//!
//! ```
//! use crossmap_core::{EdgeType, LocalKey, NodeType};
//!
//! let et: EdgeType = "tw".parse().unwrap();
//! assert_eq!(et.src, NodeType::Tweet);
//! assert_eq!(LocalKey::for_node(NodeType::Word, 0, "beach"), LocalKey::from("beach"));
//! ```

pub mod error;
pub mod source;
pub mod types;

pub use error::{CoreError, CoreResult, ErrorCategory};
pub use source::{DictionaryRecord, GraphSource, InMemorySource, NodeAttributes, FIELD_SEPARATOR};
pub use types::{EdgeType, JobId, LocalKey, NodeId, NodeType};
