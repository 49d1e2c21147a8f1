//! `crossmap neighbors <QUERY> --type <t>`
//!
//! # Output
//!
//! Text (default), one neighbor per line:
//!
//! ```text
//! 1	0	0.998713	sunny day at the beach
//! ```
//!
//! columns: rank, global id, similarity, value. `--format json` prints the
//! result list as a JSON array.

use std::path::PathBuf;

use clap::Args;
use crossmap_core::NodeType;
use crossmap_query::{Neighbor, QueryEngine};
use tracing::debug;

use crate::config::CrossmapConfig;
use crate::error::{report, CliError, CliExitCode, CliResult};

/// Output format options
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Arguments for `neighbors`
#[derive(Args, Debug)]
pub struct NeighborsArgs {
    /// Value of the query node (e.g. a word)
    pub query: String,

    /// Node type of the candidates (code or name: t, l, w, c, tweet, ...)
    #[arg(long = "type", short = 't')]
    pub target_type: NodeType,

    /// Number of neighbors; defaults to `query.neighbors`
    #[arg(short, long)]
    pub k: Option<usize>,

    /// Node dictionary; overrides `query.node_dict_path`
    #[arg(long)]
    pub nodes: Option<PathBuf>,

    /// Embedding file; overrides `query.embedding_path`
    #[arg(long)]
    pub embeddings: Option<PathBuf>,

    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

pub fn neighbors_command(args: NeighborsArgs, config: &CrossmapConfig) -> CliExitCode {
    debug!(?args, "neighbors_command");
    match run(&args, config) {
        Ok(output) => {
            println!("{}", output);
            CliExitCode::Success
        }
        Err(e) => report(&e),
    }
}

fn run(args: &NeighborsArgs, config: &CrossmapConfig) -> CliResult<String> {
    let mut query_config = config.query.clone();
    if let Some(nodes) = &args.nodes {
        query_config.node_dict_path = nodes.clone();
    }
    if let Some(embeddings) = &args.embeddings {
        query_config.embedding_path = embeddings.clone();
    }
    let engine = QueryEngine::load(&query_config)?;
    let k = args.k.unwrap_or(query_config.neighbors);
    let neighbors = engine.neighbors(&args.query, args.target_type, k)?;
    render(&neighbors, args.format)
}

fn render(neighbors: &[Neighbor], format: OutputFormat) -> CliResult<String> {
    match format {
        OutputFormat::Text => Ok(neighbors
            .iter()
            .enumerate()
            .map(|(rank, n)| {
                format!(
                    "{}\t{}\t{:.6}\t{}",
                    rank + 1,
                    n.global_id,
                    n.similarity,
                    n.value
                )
            })
            .collect::<Vec<_>>()
            .join("\n")),
        OutputFormat::Json => serde_json::to_string_pretty(neighbors)
            .map_err(|e| CliError::Config(format!("Failed to serialize result: {}", e))),
    }
}
