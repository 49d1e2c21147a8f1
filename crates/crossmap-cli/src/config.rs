//! Aggregated configuration of the `crossmap` binary.
//!
//! # TOML Structure
//!
//! ```toml
//! [[graph.derivations]]
//! edge_type = "ww"
//! power = 2
//!
//! [trainer]
//! binary = "./hin2vec"
//! interchange_dir = "GraphEmbed"
//! dim = 100
//!
//! [query]
//! node_dict_path = "node_dict.txt"
//! embedding_path = "embed_init.txt"
//! embed_dim = 100
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Field |
//! |----------|-------|
//! | `CROSSMAP_TRAINER_BINARY` | `trainer.binary` |
//! | `CROSSMAP_INTERCHANGE_DIR` | `trainer.interchange_dir` |
//! | `CROSSMAP_THREADS` | `trainer.threads` |
//! | `CROSSMAP_DIM` | `trainer.dim` and `query.embed_dim` |
//! | `CROSSMAP_NODE_DICT` | `query.node_dict_path` |
//! | `CROSSMAP_EMBEDDINGS` | `query.embedding_path` |

use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crossmap_embeddings::TrainerConfig;
use crossmap_graph::GraphConfig;
use crossmap_query::QueryConfig;
use serde::{Deserialize, Serialize};

use crate::error::{CliError, CliResult};

/// Root configuration: one section per library crate.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CrossmapConfig {
    #[serde(default)]
    pub graph: GraphConfig,
    #[serde(default)]
    pub trainer: TrainerConfig,
    #[serde(default)]
    pub query: QueryConfig,
}

impl CrossmapConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// - `CliError::Config` if the file cannot be read or parsed
    pub fn from_file(path: impl AsRef<Path>) -> CliResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        toml::from_str(&contents).map_err(|e| {
            CliError::Config(format!(
                "Failed to parse TOML in '{}': {}",
                path.display(),
                e
            ))
        })
    }

    /// Create configuration from a TOML string.
    pub fn from_toml_str(toml: &str) -> CliResult<Self> {
        toml::from_str(toml).map_err(|e| CliError::Config(format!("Failed to parse TOML: {}", e)))
    }

    /// Serialize the effective configuration.
    pub fn to_toml_string(&self) -> CliResult<String> {
        toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize to TOML: {}", e)))
    }

    /// Validate every section, then check that `train` exports vectors of
    /// the dimension `neighbors` reads.
    pub fn validate(&self) -> CliResult<()> {
        self.graph.validate()?;
        self.trainer.validate()?;
        self.query.validate()?;
        if self.trainer.dim != self.query.embed_dim {
            return Err(CliError::Config(format!(
                "trainer.dim ({}) and query.embed_dim ({}) must be equal",
                self.trainer.dim, self.query.embed_dim
            )));
        }
        Ok(())
    }

    /// Apply `CROSSMAP_*` environment variables.
    ///
    /// # Errors
    /// - `CliError::Config` if a numeric variable does not parse
    pub fn with_env_overrides(self) -> CliResult<Self> {
        self.with_overrides(|name| env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> CliResult<Self> {
        if let Some(val) = lookup("CROSSMAP_TRAINER_BINARY") {
            self.trainer.binary = PathBuf::from(val);
        }
        if let Some(val) = lookup("CROSSMAP_INTERCHANGE_DIR") {
            self.trainer.interchange_dir = PathBuf::from(val);
        }
        if let Some(val) = lookup("CROSSMAP_THREADS") {
            self.trainer.threads = parse_var("CROSSMAP_THREADS", &val)?;
        }
        if let Some(val) = lookup("CROSSMAP_DIM") {
            let dim = parse_var("CROSSMAP_DIM", &val)?;
            self.trainer.dim = dim;
            self.query.embed_dim = dim;
        }
        if let Some(val) = lookup("CROSSMAP_NODE_DICT") {
            self.query.node_dict_path = PathBuf::from(val);
        }
        if let Some(val) = lookup("CROSSMAP_EMBEDDINGS") {
            self.query.embedding_path = PathBuf::from(val);
        }
        Ok(self)
    }

    /// File (or defaults), then environment, then validation.
    pub fn load(path: Option<&Path>) -> CliResult<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        let config = config.with_env_overrides()?;
        config.validate()?;
        Ok(config)
    }
}

fn parse_var<T: FromStr>(name: &str, value: &str) -> CliResult<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| CliError::Config(format!("{}='{}': {}", name, value, e)))
}
