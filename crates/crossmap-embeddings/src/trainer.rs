//! External trainer invocation.
//!
//! The [`Trainer`] trait is the seam between a job and whatever produces the
//! vector files. [`ProcessTrainer`] runs the real executable as a blocking
//! subprocess; tests substitute their own implementations.

use std::path::{Path, PathBuf};
use std::process::Command;

use crossmap_core::JobId;
use tracing::{debug, info};

use crate::config::TrainerConfig;
use crate::error::{EmbeddingError, EmbeddingResult};

/// Flag set of one trainer run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainerInvocation {
    pub dim: usize,
    pub negative: usize,
    pub alpha: f64,
    /// Edge samples in millions, at least 1.
    pub samples_millions: u64,
    pub threads: usize,
    pub second_order: bool,
    pub job_id: JobId,
}

impl TrainerInvocation {
    pub fn from_config(config: &TrainerConfig, sample_size: u64, job_id: &JobId) -> Self {
        Self {
            dim: config.dim,
            negative: config.negative,
            alpha: config.alpha,
            samples_millions: TrainerConfig::samples_in_millions(sample_size),
            threads: config.threads,
            second_order: config.second_order,
            job_id: job_id.clone(),
        }
    }

    /// Command line arguments in the order the trainer expects.
    pub fn args(&self) -> Vec<String> {
        vec![
            "-size".to_string(),
            self.dim.to_string(),
            "-negative".to_string(),
            self.negative.to_string(),
            "-alpha".to_string(),
            self.alpha.to_string(),
            "-samples".to_string(),
            self.samples_millions.to_string(),
            "-threads".to_string(),
            self.threads.to_string(),
            "-second_order".to_string(),
            if self.second_order { "1" } else { "0" }.to_string(),
            "-job_id".to_string(),
            self.job_id.to_string(),
        ]
    }
}

/// Something that turns a job's node/edge files into vector files.
///
/// Implementations read and write inside `workdir` using the job's file
/// suffix, and return only once every output file is complete.
pub trait Trainer: Send + Sync {
    fn train(&self, invocation: &TrainerInvocation, workdir: &Path) -> EmbeddingResult<()>;
}

/// Runs the trainer executable synchronously with `workdir` as its working directory.
#[derive(Debug, Clone)]
pub struct ProcessTrainer {
    binary: PathBuf,
}

impl ProcessTrainer {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Path handed to `Command::new`.
    ///
    /// Absolute paths are used as is. Relative paths with a directory
    /// component resolve against `workdir`. Bare names are left to `PATH`.
    pub fn resolve_binary(&self, workdir: &Path) -> EmbeddingResult<PathBuf> {
        if self.binary.is_absolute() || self.binary.components().count() <= 1 {
            return Ok(self.binary.clone());
        }
        let joined = workdir.join(&self.binary);
        if joined.is_absolute() {
            Ok(joined)
        } else {
            Ok(std::env::current_dir()?.join(joined))
        }
    }
}

impl From<&TrainerConfig> for ProcessTrainer {
    fn from(config: &TrainerConfig) -> Self {
        Self::new(config.binary.clone())
    }
}

impl Trainer for ProcessTrainer {
    fn train(&self, invocation: &TrainerInvocation, workdir: &Path) -> EmbeddingResult<()> {
        let program = self.resolve_binary(workdir)?;
        let args = invocation.args();
        debug!(
            program = %program.display(),
            args = %args.join(" "),
            workdir = %workdir.display(),
            "Launching trainer"
        );

        let status = Command::new(&program)
            .args(&args)
            .current_dir(workdir)
            .status()
            .map_err(|source| EmbeddingError::TrainerSpawn {
                binary: program.display().to_string(),
                source,
            })?;

        if !status.success() {
            return Err(EmbeddingError::TrainerFailed {
                code: status.code(),
            });
        }
        info!(job_id = %invocation.job_id, "Trainer finished");
        Ok(())
    }
}
