//! Error types for loading query inputs and answering queries.

use crossmap_core::{ErrorCategory, NodeType};
use crossmap_graph::GraphError;
use thiserror::Error;

/// Errors from the query engine and the vector exporter.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The query value is not in the node dictionary.
    #[error("Unknown query value: '{0}'")]
    UnknownQuery(String),

    /// An embedding record could not be parsed.
    #[error("Format error in {path} line {line}: {reason}")]
    Format {
        path: String,
        line: usize,
        reason: String,
    },

    /// A vector does not have the configured dimension.
    #[error("Dimension mismatch for {node_type} key '{key}': expected {expected}, got {actual}")]
    DimensionMismatch {
        node_type: NodeType,
        key: String,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid query configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl QueryError {
    /// Classify this error into the shared taxonomy.
    pub fn category(&self) -> ErrorCategory {
        match self {
            QueryError::UnknownQuery(_)
            | QueryError::DimensionMismatch { .. }
            | QueryError::InvalidConfig(_) => ErrorCategory::Configuration,
            QueryError::Format { .. } => ErrorCategory::Format,
            QueryError::Graph(e) => e.category(),
            QueryError::Io(_) => ErrorCategory::Io,
        }
    }
}

/// Result type alias for query operations.
pub type QueryResult<T> = Result<T, QueryError>;
