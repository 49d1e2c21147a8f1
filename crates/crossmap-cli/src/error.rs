//! CLI errors and exit codes.
//!
//! Exit codes:
//! - 0: Success
//! - 1: I/O failure
//! - 2: Configuration error (bad config, unknown node, unknown query value)
//! - 3: Trainer process failed or produced unusable output
//! - 4: A persisted record failed to parse

use std::process::ExitCode;

use crossmap_core::{CoreError, ErrorCategory};
use crossmap_embeddings::EmbeddingError;
use crossmap_graph::GraphError;
use crossmap_query::QueryError;
use thiserror::Error;

/// Process exit codes of the `crossmap` binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CliExitCode {
    Success = 0,
    Io = 1,
    Configuration = 2,
    TrainerProcess = 3,
    Format = 4,
}

impl From<ErrorCategory> for CliExitCode {
    fn from(category: ErrorCategory) -> Self {
        match category {
            ErrorCategory::Configuration => CliExitCode::Configuration,
            ErrorCategory::TrainerProcess => CliExitCode::TrainerProcess,
            ErrorCategory::Format => CliExitCode::Format,
            ErrorCategory::Io => CliExitCode::Io,
        }
    }
}

impl From<CliExitCode> for ExitCode {
    fn from(code: CliExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Any failure a command can end with.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            CliError::Config(_) => ErrorCategory::Configuration,
            CliError::Core(e) => e.category(),
            CliError::Graph(e) => e.category(),
            CliError::Embedding(e) => e.category(),
            CliError::Query(e) => e.category(),
            CliError::Io(_) => ErrorCategory::Io,
        }
    }
}

impl From<&CliError> for CliExitCode {
    fn from(err: &CliError) -> Self {
        CliExitCode::from(err.category())
    }
}

pub type CliResult<T> = Result<T, CliError>;

/// Print the error to stderr and return its exit code.
pub fn report(err: &CliError) -> CliExitCode {
    eprintln!("error: {}", err);
    CliExitCode::from(err)
}
