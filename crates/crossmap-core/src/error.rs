//! Error types shared across the CrossMap workspace.
//!
//! Every crate defines its own `thiserror` enum, but all of them classify
//! into the same small taxonomy via [`ErrorCategory`]. Nothing is retried:
//! errors surface to the top-level caller, which decides how to report them.

use thiserror::Error;

/// Coarse classification of every CrossMap failure.
///
/// | Category | Meaning |
/// |----------|---------|
/// | Configuration | Missing node/edge data referenced by id, unresolvable query key, invalid config |
/// | TrainerProcess | External trainer exited non-zero or produced malformed/missing output |
/// | Format | A persisted text record failed to parse |
/// | Io | Filesystem failure not attributable to a record |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Configuration,
    TrainerProcess,
    Format,
    Io,
}

impl ErrorCategory {
    /// Returns the category name as snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Configuration => "configuration",
            ErrorCategory::TrainerProcess => "trainer_process",
            ErrorCategory::Format => "format",
            ErrorCategory::Io => "io",
        }
    }
}

/// Errors raised by the core type algebra and graph sources.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Node type code is not part of the alphabet.
    #[error("Unknown node type: '{0}'")]
    UnknownNodeType(String),

    /// Edge type code is not two valid node type codes.
    #[error("Unknown edge type: '{0}'")]
    UnknownEdgeType(String),

    /// A key could not be converted into the local key space of its type.
    #[error("Invalid local key '{text}' for node type '{node_type}'")]
    InvalidLocalKey { node_type: char, text: String },

    /// Job identifiers end up in file names and must be path-safe.
    #[error("Invalid job id '{0}': must be non-empty and contain only [A-Za-z0-9_.-]")]
    InvalidJobId(String),

    /// A record in a source file could not be parsed.
    #[error("Format error in {path} line {line}: {reason}")]
    Format {
        path: String,
        line: usize,
        reason: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Classify this error into the shared taxonomy.
    pub fn category(&self) -> ErrorCategory {
        match self {
            CoreError::UnknownNodeType(_)
            | CoreError::UnknownEdgeType(_)
            | CoreError::InvalidLocalKey { .. }
            | CoreError::InvalidJobId(_) => ErrorCategory::Configuration,
            CoreError::Format { .. } => ErrorCategory::Format,
            CoreError::Io(_) => ErrorCategory::Io,
        }
    }
}

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_invalid_local_key() {
        let err = CoreError::InvalidLocalKey {
            node_type: 't',
            text: "beach".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("beach"));
        assert!(msg.contains("'t'"));
    }

    #[test]
    fn test_error_display_format() {
        let err = CoreError::Format {
            path: "nodes.txt".to_string(),
            line: 7,
            reason: "expected 4 fields".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("nodes.txt"));
        assert!(msg.contains("7"));
        assert!(msg.contains("expected 4 fields"));
    }

    #[test]
    fn test_categories() {
        assert_eq!(
            CoreError::UnknownNodeType("x".into()).category(),
            ErrorCategory::Configuration
        );
        assert_eq!(
            CoreError::Format {
                path: String::new(),
                line: 1,
                reason: String::new()
            }
            .category(),
            ErrorCategory::Format
        );
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert_eq!(CoreError::from(io).category(), ErrorCategory::Io);
    }

    #[test]
    fn test_category_names() {
        assert_eq!(ErrorCategory::TrainerProcess.as_str(), "trainer_process");
        assert_eq!(ErrorCategory::Format.as_str(), "format");
    }
}
