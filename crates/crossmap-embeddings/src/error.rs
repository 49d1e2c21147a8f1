//! Error types for the trainer gateway and vector store.

use crossmap_core::ErrorCategory;
use crossmap_graph::GraphError;
use thiserror::Error;

use crate::gateway::JobState;

/// Error type for trainer jobs.
///
/// # Error Categories
///
/// | Category | Variants |
/// |----------|----------|
/// | TrainerProcess | TrainerSpawn, TrainerFailed, MissingOutput, MalformedOutput |
/// | Configuration | ConfigError, InvalidJobState, Graph |
/// | Io | IoError |
///
/// No variant is retried. A job that fails still removes its interchange files.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    // === Trainer Process Errors ===
    /// The trainer executable could not be started.
    #[error("Failed to launch trainer '{binary}': {source}")]
    TrainerSpawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    /// The trainer exited with a non-zero status (or was killed by a signal).
    #[error("Trainer exited unsuccessfully (exit code: {code:?})")]
    TrainerFailed { code: Option<i32> },

    /// An expected trainer output file does not exist.
    #[error("Trainer output missing: {path}")]
    MissingOutput { path: String },

    /// A trainer output line could not be parsed.
    #[error("Malformed trainer output in {path} line {line}: {reason}")]
    MalformedOutput {
        path: String,
        line: usize,
        reason: String,
    },

    // === Configuration Errors ===
    /// Trainer configuration invalid.
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// A job step was called out of order.
    #[error("Invalid job state: expected {expected:?}, found {actual:?}")]
    InvalidJobState { expected: JobState, actual: JobState },

    /// The graph handed to the gateway is inconsistent.
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    // === Infrastructure Errors ===
    /// Interchange file I/O failed.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl EmbeddingError {
    /// Classify this error into the shared taxonomy.
    pub fn category(&self) -> ErrorCategory {
        match self {
            EmbeddingError::TrainerSpawn { .. }
            | EmbeddingError::TrainerFailed { .. }
            | EmbeddingError::MissingOutput { .. }
            | EmbeddingError::MalformedOutput { .. } => ErrorCategory::TrainerProcess,
            EmbeddingError::ConfigError { .. }
            | EmbeddingError::InvalidJobState { .. }
            | EmbeddingError::Graph(_) => ErrorCategory::Configuration,
            EmbeddingError::IoError(_) => ErrorCategory::Io,
        }
    }
}

/// Result type alias for embedding operations.
pub type EmbeddingResult<T> = Result<T, EmbeddingError>;
