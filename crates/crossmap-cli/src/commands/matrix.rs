//! `crossmap matrix --edge-type <et>`
//!
//! Prints the shape and a few statistics of one adjacency matrix.

use clap::Args;
use crossmap_core::EdgeType;
use crossmap_graph::Normalization;
use ndarray::Array2;
use tracing::debug;

use super::{load_graph, GraphInputArgs};
use crate::config::CrossmapConfig;
use crate::error::{report, CliExitCode, CliResult};

/// Normalization choices on the command line
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum NormalizeArg {
    None,
    L1,
}

impl From<NormalizeArg> for Normalization {
    fn from(arg: NormalizeArg) -> Self {
        match arg {
            NormalizeArg::None => Normalization::None,
            NormalizeArg::L1 => Normalization::L1,
        }
    }
}

/// Arguments for `matrix`
#[derive(Args, Debug)]
pub struct MatrixArgs {
    #[command(flatten)]
    pub input: GraphInputArgs,

    /// Edge type code, e.g. `tw` or `ww`
    #[arg(long)]
    pub edge_type: EdgeType,

    /// Apply the configured derivations before building the matrix
    #[arg(long)]
    pub derive: bool,

    #[arg(long, value_enum, default_value = "none")]
    pub normalize: NormalizeArg,
}

pub fn matrix_command(args: MatrixArgs, config: &CrossmapConfig) -> CliExitCode {
    debug!(?args, "matrix_command");
    match run(&args, config) {
        Ok(output) => {
            println!("{}", output);
            CliExitCode::Success
        }
        Err(e) => report(&e),
    }
}

fn run(args: &MatrixArgs, config: &CrossmapConfig) -> CliResult<String> {
    let graph = load_graph(&args.input, &config.graph, args.derive)?;
    let matrix = graph.build_matrix_with(args.edge_type, args.normalize.into())?;
    Ok(summarize(args.edge_type, &matrix))
}

fn summarize(edge_type: EdgeType, matrix: &Array2<f64>) -> String {
    let (rows, cols) = matrix.dim();
    let nonzero: Vec<f64> = matrix.iter().copied().filter(|w| *w != 0.0).collect();
    let sum = nonzero.iter().fold(0.0, |acc, w| acc + w);
    let min = nonzero.iter().copied().fold(f64::INFINITY, f64::min);
    let max = nonzero.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mut out = format!(
        "edge type {}: {} x {}, {} non-zero cells, sum {}",
        edge_type,
        rows,
        cols,
        nonzero.len(),
        sum
    );
    if !nonzero.is_empty() {
        out.push_str(&format!(", min {}, max {}", min, max));
    }
    out
}
