//! Query engine configuration.
//!
//! ```toml
//! [query]
//! node_dict_path = "node_dict.txt"
//! embedding_path = "embed_init.txt"
//! embed_dim = 100
//! neighbors = 10
//! # placeholder_seed = 7
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{QueryError, QueryResult};

fn default_node_dict_path() -> PathBuf {
    PathBuf::from("node_dict.txt")
}

fn default_embedding_path() -> PathBuf {
    PathBuf::from("embed_init.txt")
}

fn default_embed_dim() -> usize {
    100
}

fn default_neighbors() -> usize {
    10
}

/// Inputs and defaults of the nearest-neighbor engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Node dictionary (`0x01`-separated records).
    #[serde(default = "default_node_dict_path")]
    pub node_dict_path: PathBuf,

    /// Embedding table (`rowIndex v1 .. vd`).
    #[serde(default = "default_embedding_path")]
    pub embedding_path: PathBuf,

    /// Vector dimension of every row.
    #[serde(default = "default_embed_dim")]
    pub embed_dim: usize,

    /// Default number of neighbors returned by the CLI.
    #[serde(default = "default_neighbors")]
    pub neighbors: usize,

    /// Seed for placeholder rows. Unset means a fresh entropy seed per load.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder_seed: Option<u64>,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            node_dict_path: default_node_dict_path(),
            embedding_path: default_embedding_path(),
            embed_dim: default_embed_dim(),
            neighbors: default_neighbors(),
            placeholder_seed: None,
        }
    }
}

impl QueryConfig {
    pub fn validate(&self) -> QueryResult<()> {
        if self.embed_dim == 0 {
            return Err(QueryError::InvalidConfig("embed_dim must be > 0".to_string()));
        }
        if self.neighbors == 0 {
            return Err(QueryError::InvalidConfig("neighbors must be > 0".to_string()));
        }
        if self.node_dict_path.as_os_str().is_empty() || self.embedding_path.as_os_str().is_empty()
        {
            return Err(QueryError::InvalidConfig(
                "node_dict_path and embedding_path must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
