//! `crossmap train`
//!
//! Loads a graph, applies the configured derivations, runs one trainer job and
//! exports the center vectors in the format `crossmap neighbors` reads.

use std::path::PathBuf;

use clap::Args;
use crossmap_core::{CoreError, JobId};
use crossmap_embeddings::{Gateway, VectorStore};
use crossmap_query::export_vectors;
use tracing::debug;

use super::{load_graph, GraphInputArgs};
use crate::config::CrossmapConfig;
use crate::error::{report, CliExitCode, CliResult};

fn parse_job_id(s: &str) -> Result<JobId, CoreError> {
    JobId::new(s)
}

/// Arguments for `train`
#[derive(Args, Debug)]
pub struct TrainArgs {
    #[command(flatten)]
    pub input: GraphInputArgs,

    /// Job id embedded in interchange file names (defaults to the process id)
    #[arg(long, value_parser = parse_job_id)]
    pub job_id: Option<JobId>,

    /// Edge samples; overrides `trainer.sample_size`
    #[arg(long)]
    pub sample_size: Option<u64>,

    /// Skip the configured relation derivations
    #[arg(long)]
    pub no_derive: bool,

    /// Output node dictionary; defaults to `query.node_dict_path`
    #[arg(long)]
    pub out_nodes: Option<PathBuf>,

    /// Output embedding file; defaults to `query.embedding_path`
    #[arg(long)]
    pub out_embeddings: Option<PathBuf>,
}

pub fn train_command(args: TrainArgs, config: &CrossmapConfig) -> CliExitCode {
    debug!(?args, "train_command");
    match run(&args, config) {
        Ok(summary) => {
            println!("{}", summary);
            CliExitCode::Success
        }
        Err(e) => report(&e),
    }
}

fn run(args: &TrainArgs, config: &CrossmapConfig) -> CliResult<String> {
    let graph = load_graph(&args.input, &config.graph, !args.no_derive)?;

    let gateway = Gateway::new(config.trainer.clone())?;
    let job_id = args.job_id.clone().unwrap_or_else(JobId::from_process);
    let sample_size = args.sample_size.unwrap_or(config.trainer.sample_size);
    let vectors = gateway.fit(&graph, sample_size, &job_id)?;

    let store = VectorStore::new();
    store.update_from(vectors);

    let out_nodes = args
        .out_nodes
        .clone()
        .unwrap_or_else(|| config.query.node_dict_path.clone());
    let out_embeddings = args
        .out_embeddings
        .clone()
        .unwrap_or_else(|| config.query.embedding_path.clone());
    let summary = export_vectors(
        &graph,
        &store,
        config.trainer.dim,
        &out_nodes,
        &out_embeddings,
    )?;

    Ok(format!(
        "job {}: {} nodes, {} vectors ({} without vector) -> {}, {}",
        job_id,
        summary.records,
        summary.vectors,
        summary.missing,
        out_nodes.display(),
        out_embeddings.display()
    ))
}
