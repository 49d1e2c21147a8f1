//! CrossMap CLI
//!
//! # Commands
//!
//! - `train`: build a typed graph from files, run the external trainer, export vectors
//! - `neighbors`: nearest neighbors of a value among nodes of one type
//! - `matrix`: inspect one adjacency matrix
//! - `config`: print the effective configuration
//!
//! Configuration comes from `--config <file>` (TOML) or built-in defaults,
//! then `CROSSMAP_*` environment variables. Logs go to stderr; `-v`, `-vv`
//! and `-vvv` select info, debug and trace, otherwise `RUST_LOG` or `warn`.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod config;
mod error;

use config::CrossmapConfig;
use error::{report, CliExitCode};

/// CrossMap - heterogeneous graph embedding and nearest-neighbor queries
#[derive(Parser)]
#[command(name = "crossmap")]
#[command(author = "CrossMap Team")]
#[command(version = "0.1.0")]
#[command(about = "Train heterogeneous graph embeddings and query nearest neighbors")]
#[command(propagate_version = true)]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// TOML configuration file
    #[arg(long, global = true, env = "CROSSMAP_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train embeddings for a graph and export them
    Train(commands::train::TrainArgs),
    /// Find the nearest neighbors of a value
    Neighbors(commands::neighbors::NeighborsArgs),
    /// Summarize one adjacency matrix
    Matrix(commands::matrix::MatrixArgs),
    /// Print the effective configuration as TOML
    Config,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();

    let config = match CrossmapConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => return report(&e).into(),
    };

    let exit_code: CliExitCode = match cli.command {
        Commands::Train(args) => commands::train::train_command(args, &config),
        Commands::Neighbors(args) => commands::neighbors::neighbors_command(args, &config),
        Commands::Matrix(args) => commands::matrix::matrix_command(args, &config),
        Commands::Config => match config.to_toml_string() {
            Ok(text) => {
                print!("{}", text);
                CliExitCode::Success
            }
            Err(e) => report(&e),
        },
    };

    exit_code.into()
}
