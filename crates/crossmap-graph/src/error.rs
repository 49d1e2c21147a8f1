//! Error types for typed graph operations.
//!
//! Covers graph construction from a [`GraphSource`](crossmap_core::GraphSource),
//! adjacency matrix construction and relation derivation. Every variant is
//! fatal: construction never silently drops a node or edge.

use crossmap_core::{EdgeType, ErrorCategory, LocalKey, NodeId, NodeType};
use thiserror::Error;

/// Result type alias for graph operations.
pub type GraphResult<T> = Result<T, GraphError>;

/// Comprehensive error type for typed graph operations.
#[derive(Error, Debug)]
pub enum GraphError {
    // ========== Construction Errors ==========
    /// A global id has no attributes in the source.
    #[error("Node {id} is referenced but has no attributes")]
    MissingNode { id: NodeId },

    /// An edge endpoint is not listed under its node type.
    #[error("Node {id} is not listed under node type '{node_type}'")]
    UnlistedNode { id: NodeId, node_type: NodeType },

    /// A global id is listed under one type but recorded as another.
    #[error("Node {id} listed as '{expected}' but recorded as '{actual}'")]
    NodeTypeMismatch {
        id: NodeId,
        expected: NodeType,
        actual: NodeType,
    },

    /// An edge endpoint does not have the type its edge type requires.
    #[error("Edge type '{edge_type}' endpoint {id} has type '{actual}'")]
    EdgeEndpointMismatch {
        edge_type: EdgeType,
        id: NodeId,
        actual: NodeType,
    },

    /// Two nodes of one type share a local id.
    #[error("Duplicate local id {local_id} in node type '{node_type}'")]
    DuplicateLocalId { node_type: NodeType, local_id: usize },

    /// Local ids of a type are not contiguous from zero.
    #[error("Local id {local_id} out of range for node type '{node_type}' with {count} nodes")]
    LocalIdOutOfRange {
        node_type: NodeType,
        local_id: usize,
        count: usize,
    },

    /// Two nodes of one type map to the same local key.
    #[error("Duplicate key '{key}' in node type '{node_type}'")]
    DuplicateKey { node_type: NodeType, key: LocalKey },

    /// A literal key cannot be written to a line-oriented interchange file.
    #[error("Key {key:?} in node type '{node_type}' contains a tab or line break")]
    UnwritableKey { node_type: NodeType, key: String },

    /// Edge weight is negative, NaN or infinite.
    #[error("Invalid weight {weight} in edge type '{edge_type}' (must be finite and >= 0)")]
    InvalidWeight { edge_type: EdgeType, weight: f64 },

    // ========== Lookup Errors ==========
    /// No node table exists for the requested type.
    #[error("Node type '{0}' has no nodes in this graph")]
    UnknownNodeType(NodeType),

    /// A local key is not part of its node table.
    #[error("Key '{key}' not found in node type '{node_type}'")]
    UnknownKey { node_type: NodeType, key: LocalKey },

    // ========== Matrix Errors ==========
    /// Derivation parameters cannot be applied.
    #[error("Invalid derivation for '{edge_type}': {reason}")]
    InvalidDerivation { edge_type: EdgeType, reason: String },

    /// Matrix shape does not match the node counts of an edge type.
    #[error("Matrix shape mismatch for '{edge_type}': expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        edge_type: EdgeType,
        expected: (usize, usize),
        actual: (usize, usize),
    },

    // ========== Configuration Errors ==========
    /// Invalid configuration parameter.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl GraphError {
    /// Classify this error into the shared taxonomy.
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::Configuration
    }
}
