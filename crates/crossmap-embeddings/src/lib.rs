//! CrossMap Embedding Gateway
//!
//! Bridges a [`crossmap_graph::TypedGraph`] and an external embedding trainer
//! through plain-text interchange files, and keeps the trained vectors in a
//! shared [`VectorStore`].
//!
//! # Architecture
//!
//! - **interchange**: file layout, node/edge writers, vector file parser
//! - **trainer**: `Trainer` trait and the subprocess-backed `ProcessTrainer`
//! - **gateway**: `TrainingJob` state machine and `Gateway::fit`
//! - **store**: `VectorStore` with whole-table replacement per node type
//! - **config**: `TrainerConfig`
//! - **error**: `EmbeddingError`
//!
//! # Job lifecycle
//!
//! ```text
//! Idle ──write_interchange──► Serialized ──invoke_trainer──► Running
//!                                                              │
//!          CleanedUp ◄──cleanup── Parsed ◄──read_outputs───────┘
//! ```
//!
//! Every interchange file of a job carries the suffix `-<job_id>.txt`; `fit`
//! removes them on success and on failure.

pub mod config;
pub mod error;
pub mod gateway;
pub mod interchange;
pub mod store;
pub mod trainer;

pub use config::TrainerConfig;
pub use error::{EmbeddingError, EmbeddingResult};
pub use gateway::{Gateway, JobState, TrainedVectors, TrainingJob};
pub use interchange::{InterchangeLayout, VectorKind, VectorTable, EDGE_FLAG};
pub use store::VectorStore;
pub use trainer::{ProcessTrainer, Trainer, TrainerInvocation};
