//! Trainer configuration.
//!
//! Hyperparameters handed to the external trainer plus the location of the
//! trainer executable and the interchange directory.
//!
//! # TOML Structure
//!
//! ```toml
//! [trainer]
//! binary = "./hin2vec"
//! interchange_dir = "GraphEmbed"
//! dim = 100
//! negative = 5
//! alpha = 0.025
//! threads = 10
//! second_order = false
//! sample_size = 1000000
//! category_list = ["food", "shop"]
//! ```

use std::path::PathBuf;

use crossmap_graph::has_line_break_or_tab;
use serde::{Deserialize, Serialize};

use crate::error::{EmbeddingError, EmbeddingResult};

fn default_binary() -> PathBuf {
    PathBuf::from("./hin2vec")
}

fn default_interchange_dir() -> PathBuf {
    PathBuf::from("GraphEmbed")
}

fn default_dim() -> usize {
    100
}

fn default_negative() -> usize {
    5
}

fn default_alpha() -> f64 {
    0.025
}

fn default_threads() -> usize {
    10
}

fn default_sample_size() -> u64 {
    1_000_000
}

/// Configuration of the external embedding trainer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainerConfig {
    /// Trainer executable. Paths with a directory component that are relative
    /// (e.g. `./hin2vec`) resolve against `interchange_dir`; bare names go
    /// through `PATH`.
    #[serde(default = "default_binary")]
    pub binary: PathBuf,

    /// Directory holding the per-job interchange files; the trainer runs here.
    #[serde(default = "default_interchange_dir")]
    pub interchange_dir: PathBuf,

    /// Embedding dimension (`-size`).
    #[serde(default = "default_dim")]
    pub dim: usize,

    /// Negative samples per positive (`-negative`).
    #[serde(default = "default_negative")]
    pub negative: usize,

    /// Initial learning rate (`-alpha`).
    #[serde(default = "default_alpha")]
    pub alpha: f64,

    /// Trainer worker threads (`-threads`).
    #[serde(default = "default_threads")]
    pub threads: usize,

    /// Second-order proximity toggle (`-second_order`).
    #[serde(default)]
    pub second_order: bool,

    /// Number of edge samples; passed in millions, at least 1.
    #[serde(default = "default_sample_size")]
    pub sample_size: u64,

    /// Category values written as the auxiliary `c` node list when the graph
    /// has no category nodes.
    #[serde(default)]
    pub category_list: Vec<String>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            binary: default_binary(),
            interchange_dir: default_interchange_dir(),
            dim: default_dim(),
            negative: default_negative(),
            alpha: default_alpha(),
            threads: default_threads(),
            second_order: false,
            sample_size: default_sample_size(),
            category_list: Vec::new(),
        }
    }
}

impl TrainerConfig {
    /// Validate trainer configuration values.
    pub fn validate(&self) -> EmbeddingResult<()> {
        let fail = |message: String| Err(EmbeddingError::ConfigError { message });
        if self.binary.as_os_str().is_empty() {
            return fail("binary must not be empty".to_string());
        }
        if self.interchange_dir.as_os_str().is_empty() {
            return fail("interchange_dir must not be empty".to_string());
        }
        if self.dim == 0 {
            return fail("dim must be > 0".to_string());
        }
        if self.threads == 0 {
            return fail("threads must be > 0".to_string());
        }
        if !(self.alpha.is_finite() && self.alpha > 0.0) {
            return fail(format!("alpha must be finite and > 0, got {}", self.alpha));
        }
        if let Some(bad) = self
            .category_list
            .iter()
            .find(|c| has_line_break_or_tab(c))
        {
            return fail(format!(
                "category_list entry {:?} contains a tab or line break",
                bad
            ));
        }
        Ok(())
    }

    /// Sample count in millions as passed to `-samples`: `max(1, sample_size / 1_000_000)`.
    pub fn samples_in_millions(sample_size: u64) -> u64 {
        (sample_size / 1_000_000).max(1)
    }
}
