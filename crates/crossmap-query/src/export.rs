//! Write trained vectors in the formats [`QueryEngine`](crate::QueryEngine) loads.
//!
//! Rows of the embedding file are global ids; the center vector is exported.
//! Graph nodes without a stored vector get a dictionary record but no
//! embedding row, so the engine fills them with a placeholder.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crossmap_core::{DictionaryRecord, NodeAttributes};
use crossmap_embeddings::{VectorKind, VectorStore};
use crossmap_graph::TypedGraph;
use tracing::{info, warn};

use crate::error::{QueryError, QueryResult};

/// Counts of one export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExportSummary {
    pub records: usize,
    pub vectors: usize,
    pub missing: usize,
}

/// Write the node dictionary of `graph` and the center vectors in `store`.
///
/// # Errors
/// `DimensionMismatch` if a stored vector's length differs from `dim`.
pub fn export_vectors(
    graph: &TypedGraph,
    store: &VectorStore,
    dim: usize,
    node_dict_path: &Path,
    embedding_path: &Path,
) -> QueryResult<ExportSummary> {
    let mut dict_out = BufWriter::new(File::create(node_dict_path)?);
    let mut embed_out = BufWriter::new(File::create(embedding_path)?);
    let mut summary = ExportSummary::default();

    for node_type in graph.node_types() {
        let table = graph.require_nodes(node_type)?;
        let vectors = store.snapshot(node_type, VectorKind::Center);
        for (local_id, key, global_id, value) in table.iter() {
            let record = DictionaryRecord {
                global_id,
                attributes: NodeAttributes {
                    node_type,
                    local_id,
                    value: value.to_string(),
                },
            };
            writeln!(dict_out, "{}", record.to_line())?;
            summary.records += 1;

            let Some(vector) = vectors.as_ref().and_then(|t| t.get(key)) else {
                summary.missing += 1;
                continue;
            };
            if vector.len() != dim {
                return Err(QueryError::DimensionMismatch {
                    node_type,
                    key: key.to_string(),
                    expected: dim,
                    actual: vector.len(),
                });
            }
            let values: Vec<String> = vector.iter().map(|v| v.to_string()).collect();
            writeln!(embed_out, "{} {}", global_id, values.join(" "))?;
            summary.vectors += 1;
        }
    }
    dict_out.flush()?;
    embed_out.flush()?;

    if summary.missing > 0 {
        warn!(
            missing = summary.missing,
            "Exported nodes without trained vectors"
        );
    }
    info!(
        records = summary.records,
        vectors = summary.vectors,
        node_dict = %node_dict_path.display(),
        embeddings = %embedding_path.display(),
        "Exported vectors"
    );
    Ok(summary)
}
