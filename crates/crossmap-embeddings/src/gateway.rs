//! Trainer gateway: one training job per `fit` call.
//!
//! A [`TrainingJob`] walks `Idle → Serialized → Running → Parsed → CleanedUp`.
//! Each step checks the current state and fails with `InvalidJobState` when
//! called out of order. `cleanup` is accepted from every state.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use crossmap_core::{EdgeType, JobId, LocalKey, NodeType};
use crossmap_graph::TypedGraph;
use tracing::{debug, info, warn};

use crate::config::TrainerConfig;
use crate::error::{EmbeddingError, EmbeddingResult};
use crate::interchange::{
    read_vector_file, write_edge_file, write_node_file, InterchangeLayout, VectorKind, VectorTable,
};
use crate::trainer::{ProcessTrainer, Trainer, TrainerInvocation};

/// Lifecycle state of a [`TrainingJob`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Idle,
    /// Interchange files are on disk.
    Serialized,
    /// The trainer exited successfully; output files are expected.
    Running,
    /// Output files have been parsed.
    Parsed,
    CleanedUp,
}

/// Center and context vectors for every node type of the trained graph.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainedVectors {
    pub center: HashMap<NodeType, VectorTable>,
    pub context: HashMap<NodeType, VectorTable>,
}

impl TrainedVectors {
    pub fn table(&self, node_type: NodeType, kind: VectorKind) -> Option<&VectorTable> {
        match kind {
            VectorKind::Center => self.center.get(&node_type),
            VectorKind::Context => self.context.get(&node_type),
        }
    }

    pub fn node_types(&self) -> Vec<NodeType> {
        let mut types: Vec<NodeType> = self.center.keys().copied().collect();
        types.sort();
        types
    }
}

// ========== Training Job ==========

/// A single trainer run and the files it owns.
///
/// Dropping a job that has not been cleaned up removes its files.
#[derive(Debug)]
pub struct TrainingJob {
    job_id: JobId,
    layout: InterchangeLayout,
    state: JobState,
    trained_types: Vec<NodeType>,
}

impl TrainingJob {
    pub fn new(dir: impl Into<PathBuf>, job_id: JobId) -> Self {
        let layout = InterchangeLayout::new(dir, &job_id);
        Self {
            job_id,
            layout,
            state: JobState::Idle,
            trained_types: Vec::new(),
        }
    }

    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn layout(&self) -> &InterchangeLayout {
        &self.layout
    }

    fn expect_state(&self, expected: JobState) -> EmbeddingResult<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(EmbeddingError::InvalidJobState {
                expected,
                actual: self.state,
            })
        }
    }

    fn transition(&mut self, next: JobState) {
        debug!(job_id = %self.job_id, from = ?self.state, to = ?next, "Job transition");
        self.state = next;
    }

    /// Write node files for every type and edge files for every ordered type pair.
    ///
    /// When the graph has no category nodes, a category node file is written
    /// from `category_list` (possibly empty) since the trainer always expects one.
    pub fn write_interchange(
        &mut self,
        graph: &TypedGraph,
        category_list: &[String],
    ) -> EmbeddingResult<()> {
        self.expect_state(JobState::Idle)?;

        let mut file_types = graph.node_types();
        for &node_type in &file_types {
            let table = graph.require_nodes(node_type)?;
            write_node_file(&self.layout.node_file(node_type), table.keys())?;
        }
        if !file_types.contains(&NodeType::Category) {
            let keys: Vec<LocalKey> = category_list
                .iter()
                .map(|c| LocalKey::Literal(c.clone()))
                .collect();
            write_node_file(&self.layout.node_file(NodeType::Category), &keys)?;
            file_types.push(NodeType::Category);
            file_types.sort();
        }

        let mut edges = 0;
        let pairs = EdgeType::all_pairs(&file_types);
        for &edge_type in &pairs {
            edges += write_edge_file(&self.layout.edge_file(edge_type), graph.relation(edge_type))?;
        }

        self.trained_types = graph.node_types();
        info!(
            job_id = %self.job_id,
            node_files = file_types.len(),
            edge_files = pairs.len(),
            edges,
            "Wrote interchange files"
        );
        self.transition(JobState::Serialized);
        Ok(())
    }

    /// Run the trainer and block until it exits.
    ///
    /// On failure the job stays `Serialized`; only `cleanup` is meaningful afterwards.
    pub fn invoke_trainer(
        &mut self,
        trainer: &dyn Trainer,
        invocation: &TrainerInvocation,
    ) -> EmbeddingResult<()> {
        self.expect_state(JobState::Serialized)?;
        trainer.train(invocation, self.layout.dir())?;
        self.transition(JobState::Running);
        Ok(())
    }

    /// Parse center and context vectors for every node type of the written graph.
    pub fn read_outputs(&mut self, expected_dim: Option<usize>) -> EmbeddingResult<TrainedVectors> {
        self.expect_state(JobState::Running)?;
        let mut vectors = TrainedVectors::default();
        for &node_type in &self.trained_types {
            let center = read_vector_file(
                &self.layout.vector_file(node_type, VectorKind::Center),
                node_type,
                expected_dim,
            )?;
            let context = read_vector_file(
                &self.layout.vector_file(node_type, VectorKind::Context),
                node_type,
                expected_dim,
            )?;
            vectors.center.insert(node_type, center);
            vectors.context.insert(node_type, context);
        }
        self.transition(JobState::Parsed);
        Ok(vectors)
    }

    /// Remove every file carrying this job's suffix.
    pub fn cleanup(&mut self) -> EmbeddingResult<usize> {
        let removed = self.layout.cleanup()?;
        info!(job_id = %self.job_id, removed, "Removed interchange files");
        self.transition(JobState::CleanedUp);
        Ok(removed)
    }
}

impl Drop for TrainingJob {
    fn drop(&mut self) {
        if self.state != JobState::CleanedUp {
            if let Err(e) = self.layout.cleanup() {
                warn!(job_id = %self.job_id, error = %e, "Cleanup on drop failed");
            }
        }
    }
}

// ========== Gateway ==========

/// Runs complete training jobs against one trainer.
///
/// Holds no per-job state; every `fit` is independent.
#[derive(Debug, Clone)]
pub struct Gateway<T: Trainer = ProcessTrainer> {
    config: TrainerConfig,
    trainer: T,
}

impl Gateway<ProcessTrainer> {
    /// Gateway running the executable named in `config.binary`.
    pub fn new(config: TrainerConfig) -> EmbeddingResult<Self> {
        let trainer = ProcessTrainer::from(&config);
        Self::with_trainer(config, trainer)
    }
}

impl<T: Trainer> Gateway<T> {
    pub fn with_trainer(config: TrainerConfig, trainer: T) -> EmbeddingResult<Self> {
        config.validate()?;
        Ok(Self { config, trainer })
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    pub fn trainer(&self) -> &T {
        &self.trainer
    }

    /// Serialize `graph`, train, parse the vectors and remove the job files.
    ///
    /// Files are removed whether or not training succeeded. A cleanup failure
    /// is reported only when the job itself succeeded.
    pub fn fit(
        &self,
        graph: &TypedGraph,
        sample_size: u64,
        job_id: &JobId,
    ) -> EmbeddingResult<TrainedVectors> {
        fs::create_dir_all(&self.config.interchange_dir)?;
        let mut job = TrainingJob::new(&self.config.interchange_dir, job_id.clone());
        info!(job_id = %job_id, dir = %self.config.interchange_dir.display(), "Starting training job");

        let outcome = self.run(&mut job, graph, sample_size);
        let cleaned = job.cleanup();
        match (outcome, cleaned) {
            (Ok(vectors), Ok(_)) => Ok(vectors),
            (Ok(_), Err(e)) => Err(e),
            (Err(e), Ok(_)) => Err(e),
            (Err(e), Err(cleanup_err)) => {
                warn!(job_id = %job_id, error = %cleanup_err, "Cleanup after failed job also failed");
                Err(e)
            }
        }
    }

    fn run(
        &self,
        job: &mut TrainingJob,
        graph: &TypedGraph,
        sample_size: u64,
    ) -> EmbeddingResult<TrainedVectors> {
        job.write_interchange(graph, &self.config.category_list)?;
        let invocation = TrainerInvocation::from_config(&self.config, sample_size, job.job_id());
        job.invoke_trainer(&self.trainer, &invocation)?;
        job.read_outputs(Some(self.config.dim))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossmap_core::InMemorySource;
    use std::path::Path;

    /// Writes one constant vector per node key; never touches the category file.
    struct ConstantTrainer {
        dim: usize,
    }

    impl Trainer for ConstantTrainer {
        fn train(&self, inv: &TrainerInvocation, workdir: &Path) -> EmbeddingResult<()> {
            let suffix = inv.job_id.file_suffix();
            for nt in [NodeType::Tweet, NodeType::Word] {
                let keys = fs::read_to_string(workdir.join(format!("node-{}{}", nt, suffix)))?;
                let vec = vec!["0.5"; self.dim].join(" ");
                let body: String = keys.lines().map(|k| format!("{k}\t{vec}\n")).collect();
                fs::write(workdir.join(format!("output-{}{}", nt, suffix)), &body)?;
                fs::write(workdir.join(format!("context-{}{}", nt, suffix)), &body)?;
            }
            Ok(())
        }
    }

    fn graph() -> TypedGraph {
        let tw = EdgeType::new(NodeType::Tweet, NodeType::Word);
        let mut src = InMemorySource::new();
        src.add_node(0, NodeType::Tweet, 0, "t0")
            .add_node(1, NodeType::Word, 0, "beach")
            .add_edge(tw, 0, 1, 2.0);
        TypedGraph::from_source(&src).unwrap()
    }

    #[test]
    fn test_write_interchange_injects_category_and_all_pairs() {
        let dir = tempfile::tempdir().unwrap();
        let mut job = TrainingJob::new(dir.path(), JobId::new("5").unwrap());
        job.write_interchange(&graph(), &["food".to_string()]).unwrap();
        assert_eq!(job.state(), JobState::Serialized);

        let category = fs::read_to_string(dir.path().join("node-c-5.txt")).unwrap();
        assert_eq!(category, "food\n");
        // {c, t, w} squared
        let edge_files = job
            .layout()
            .job_files()
            .unwrap()
            .iter()
            .filter(|p| p.file_name().unwrap().to_string_lossy().starts_with("edge-"))
            .count();
        assert_eq!(edge_files, 9);
        let tw = fs::read_to_string(dir.path().join("edge-tw-5.txt")).unwrap();
        assert_eq!(tw, "0\tbeach\t2\te\n");
        assert_eq!(fs::read_to_string(dir.path().join("edge-cc-5.txt")).unwrap(), "");
        job.cleanup().unwrap();
    }

    #[test]
    fn test_out_of_order_steps_fail() {
        let dir = tempfile::tempdir().unwrap();
        let mut job = TrainingJob::new(dir.path(), JobId::new("6").unwrap());
        let err = job.read_outputs(None).unwrap_err();
        assert!(matches!(
            err,
            EmbeddingError::InvalidJobState {
                expected: JobState::Running,
                actual: JobState::Idle
            }
        ));
        job.write_interchange(&graph(), &[]).unwrap();
        assert!(job.write_interchange(&graph(), &[]).is_err());
        job.cleanup().unwrap();
        assert_eq!(job.state(), JobState::CleanedUp);
    }

    #[test]
    fn test_drop_removes_files() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut job = TrainingJob::new(dir.path(), JobId::new("7").unwrap());
            job.write_interchange(&graph(), &[]).unwrap();
            assert!(!job.layout().job_files().unwrap().is_empty());
        }
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_fit_with_constant_trainer() {
        let dir = tempfile::tempdir().unwrap();
        let config = TrainerConfig {
            interchange_dir: dir.path().join("embed"),
            dim: 3,
            ..Default::default()
        };
        let gateway = Gateway::with_trainer(config, ConstantTrainer { dim: 3 }).unwrap();
        let vectors = gateway.fit(&graph(), 0, &JobId::new("8").unwrap()).unwrap();

        assert_eq!(vectors.node_types(), vec![NodeType::Tweet, NodeType::Word]);
        assert_eq!(
            vectors.center[&NodeType::Word][&LocalKey::from("beach")],
            vec![0.5, 0.5, 0.5]
        );
        assert!(vectors.center[&NodeType::Tweet].contains_key(&LocalKey::Index(0)));
        assert!(!vectors.center.contains_key(&NodeType::Category));
        assert_eq!(fs::read_dir(dir.path().join("embed")).unwrap().count(), 0);
    }

    #[test]
    fn test_fit_rejects_wrong_dimension() {
        let dir = tempfile::tempdir().unwrap();
        let config = TrainerConfig {
            interchange_dir: dir.path().to_path_buf(),
            dim: 4,
            ..Default::default()
        };
        let gateway = Gateway::with_trainer(config, ConstantTrainer { dim: 3 }).unwrap();
        let err = gateway.fit(&graph(), 0, &JobId::new("9").unwrap()).unwrap_err();
        assert!(matches!(err, EmbeddingError::MalformedOutput { .. }));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_gateway_rejects_invalid_config() {
        let config = TrainerConfig {
            threads: 0,
            ..Default::default()
        };
        assert!(Gateway::new(config).is_err());
    }
}
