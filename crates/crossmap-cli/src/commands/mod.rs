//! CLI command handlers
//!
//! # Modules
//!
//! - `train`: build the graph, run the trainer, export vectors
//! - `neighbors`: top-K cosine neighbors of a value
//! - `matrix`: summary of one adjacency matrix

pub mod matrix;
pub mod neighbors;
pub mod train;

use std::path::PathBuf;

use clap::Args;
use crossmap_core::InMemorySource;
use crossmap_graph::{GraphConfig, TypedGraph};
use tracing::{info, warn};

use crate::error::CliResult;

/// Input files of a graph.
#[derive(Args, Debug, Clone)]
pub struct GraphInputArgs {
    /// Node dictionary (0x01-separated: globalId, type, localId, value)
    #[arg(long)]
    pub nodes: PathBuf,

    /// Edge list (tab-separated: edgeType, srcGlobalId, dstGlobalId, weight)
    #[arg(long)]
    pub edges: PathBuf,
}

/// Load the graph and apply the configured derivations whose types it has.
pub(crate) fn load_graph(
    input: &GraphInputArgs,
    graph_config: &GraphConfig,
    derive: bool,
) -> CliResult<TypedGraph> {
    let source = InMemorySource::from_files(&input.nodes, &input.edges)?;
    let mut graph = TypedGraph::from_source(&source)?;
    info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "Loaded graph"
    );
    if derive {
        let (applicable, skipped): (Vec<_>, Vec<_>) = graph_config
            .derivations
            .iter()
            .cloned()
            .partition(|spec| graph.nodes(spec.edge_type.src).is_some());
        for spec in &skipped {
            warn!(edge_type = %spec.edge_type, "Skipping derivation: node type not in graph");
        }
        graph.apply_derivations(&applicable)?;
    }
    Ok(graph)
}
