//! Configuration for typed graph construction.
//!
//! Derived relations are configured as a list of (edge type, power) pairs
//! instead of being hard-coded for one relation.
//!
//! # TOML Structure
//!
//! ```toml
//! [[graph.derivations]]
//! edge_type = "ww"
//! power = 2
//! normalize = "none"
//! ```

use std::collections::HashSet;

use crossmap_core::{EdgeType, NodeType};
use serde::{Deserialize, Serialize};

use crate::error::{GraphError, GraphResult};

/// Row normalization applied to an adjacency matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    /// Weights pass through unmodified.
    #[default]
    None,
    /// Each non-zero row is scaled to sum to 1.
    L1,
}

fn default_power() -> u32 {
    2
}

/// One derived relation: `edge_type` is replaced by its adjacency matrix raised to `power`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivationSpec {
    pub edge_type: EdgeType,

    /// Matrix power (>= 1). Default: 2 (two-hop relation).
    #[serde(default = "default_power")]
    pub power: u32,

    /// Normalization applied to the base matrix before exponentiation.
    #[serde(default)]
    pub normalize: Normalization,
}

impl DerivationSpec {
    pub fn new(edge_type: EdgeType, power: u32) -> Self {
        Self {
            edge_type,
            power,
            normalize: Normalization::None,
        }
    }

    /// Builder: set base matrix normalization.
    #[must_use]
    pub fn with_normalization(mut self, normalize: Normalization) -> Self {
        self.normalize = normalize;
        self
    }

    pub fn validate(&self) -> GraphResult<()> {
        if self.power == 0 {
            return Err(GraphError::InvalidConfig(format!(
                "derivation '{}': power must be >= 1",
                self.edge_type
            )));
        }
        if !self.edge_type.is_homogeneous() {
            return Err(GraphError::InvalidConfig(format!(
                "derivation '{}': matrix powers need a square relation (same source and destination type)",
                self.edge_type
            )));
        }
        Ok(())
    }
}

/// Typed graph configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Relations replaced by a matrix power after construction, all computed
    /// from the relations as loaded.
    #[serde(default)]
    pub derivations: Vec<DerivationSpec>,
}

impl Default for GraphConfig {
    /// Word-word second-order relation, as used for multi-hop word similarity.
    fn default() -> Self {
        Self {
            derivations: vec![DerivationSpec::new(
                EdgeType::new(NodeType::Word, NodeType::Word),
                2,
            )],
        }
    }
}

impl GraphConfig {
    /// Configuration without any derived relation.
    pub fn without_derivations() -> Self {
        Self {
            derivations: Vec::new(),
        }
    }

    /// Validate all derivations; an edge type may be derived at most once.
    pub fn validate(&self) -> GraphResult<()> {
        let mut seen = HashSet::new();
        for spec in &self.derivations {
            spec.validate()?;
            if !seen.insert(spec.edge_type) {
                return Err(GraphError::InvalidConfig(format!(
                    "edge type '{}' is derived more than once",
                    spec.edge_type
                )));
            }
        }
        Ok(())
    }
}
