//! Interchange file set shared with the external trainer.
//!
//! Every file of a job carries the suffix `-<job_id>.txt`:
//!
//! | File | Content |
//! |------|---------|
//! | `node-<t><suffix>` | one local key per line |
//! | `edge-<s><d><suffix>` | `src<TAB>dst<TAB>weight<TAB>e` per edge |
//! | `output-<t><suffix>` | `key<TAB>v1 v2 .. vd` center vectors (written by the trainer) |
//! | `context-<t><suffix>` | `key<TAB>v1 v2 .. vd` context vectors (written by the trainer) |

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crossmap_core::source::strip_line_terminator;
use crossmap_core::{EdgeType, JobId, LocalKey, NodeType};
use crossmap_graph::EdgeRelation;
use tracing::{debug, warn};

use crate::error::{EmbeddingError, EmbeddingResult};

/// Constant fourth column of every edge record.
pub const EDGE_FLAG: &str = "e";

/// Per-type mapping from local key to vector.
pub type VectorTable = HashMap<LocalKey, Vec<f32>>;

/// Which of the two trained vectors a file or table holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VectorKind {
    /// Center ("output") vectors.
    Center,
    /// Context vectors.
    Context,
}

impl VectorKind {
    /// File name prefix written by the trainer.
    pub fn file_prefix(&self) -> &'static str {
        match self {
            VectorKind::Center => "output-",
            VectorKind::Context => "context-",
        }
    }
}

/// File names of one job inside the interchange directory.
#[derive(Debug, Clone)]
pub struct InterchangeLayout {
    dir: PathBuf,
    suffix: String,
}

impl InterchangeLayout {
    pub fn new(dir: impl Into<PathBuf>, job_id: &JobId) -> Self {
        Self {
            dir: dir.into(),
            suffix: job_id.file_suffix(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub fn node_file(&self, node_type: NodeType) -> PathBuf {
        self.dir
            .join(format!("node-{}{}", node_type.code(), self.suffix))
    }

    pub fn edge_file(&self, edge_type: EdgeType) -> PathBuf {
        self.dir.join(format!("edge-{}{}", edge_type, self.suffix))
    }

    pub fn vector_file(&self, node_type: NodeType, kind: VectorKind) -> PathBuf {
        self.dir.join(format!(
            "{}{}{}",
            kind.file_prefix(),
            node_type.code(),
            self.suffix
        ))
    }

    /// Every file in the directory that carries this job's suffix.
    pub fn job_files(&self) -> EmbeddingResult<Vec<PathBuf>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let name = entry.file_name();
            if name.to_string_lossy().ends_with(&self.suffix) {
                files.push(entry.path());
            }
        }
        files.sort();
        Ok(files)
    }

    /// Remove every file carrying this job's suffix. Returns the number removed.
    ///
    /// Keeps going after a failed removal and reports the first error at the end.
    pub fn cleanup(&self) -> EmbeddingResult<usize> {
        let mut removed = 0;
        let mut first_error = None;
        for path in self.job_files()? {
            match fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to remove interchange file");
                    first_error.get_or_insert(e);
                }
            }
        }
        match first_error {
            Some(e) => Err(e.into()),
            None => Ok(removed),
        }
    }
}

/// Write one local key per line.
pub fn write_node_file<'a>(
    path: &Path,
    keys: impl IntoIterator<Item = &'a LocalKey>,
) -> EmbeddingResult<usize> {
    let mut out = BufWriter::new(File::create(path)?);
    let mut count = 0;
    for key in keys {
        writeln!(out, "{}", key)?;
        count += 1;
    }
    out.flush()?;
    Ok(count)
}

/// Write an edge list; an absent relation produces an empty file.
pub fn write_edge_file(path: &Path, relation: Option<&EdgeRelation>) -> EmbeddingResult<usize> {
    let mut out = BufWriter::new(File::create(path)?);
    let mut count = 0;
    if let Some(relation) = relation {
        for (u, row) in relation {
            for (v, weight) in row {
                writeln!(out, "{}\t{}\t{}\t{}", u, v, weight, EDGE_FLAG)?;
                count += 1;
            }
        }
    }
    out.flush()?;
    Ok(count)
}

/// Parse a trainer vector file into a [`VectorTable`].
///
/// Keys are converted in the local key space of `node_type`. Every vector
/// must have the same length, equal to `expected_dim` when given.
///
/// # Errors
/// - `MissingOutput` if the file does not exist
/// - `MalformedOutput` on the first line that fails to parse or holds a
///   non-finite component
pub fn read_vector_file(
    path: &Path,
    node_type: NodeType,
    expected_dim: Option<usize>,
) -> EmbeddingResult<VectorTable> {
    let display = path.display().to_string();
    let contents = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(EmbeddingError::MissingOutput { path: display });
        }
        Err(e) => return Err(e.into()),
    };

    let malformed = |line: usize, reason: String| EmbeddingError::MalformedOutput {
        path: display.clone(),
        line,
        reason,
    };

    let mut table = VectorTable::new();
    let mut dim = expected_dim;
    for (idx, raw) in contents.split_inclusive('\n').enumerate() {
        let line_no = idx + 1;
        let line = strip_line_terminator(raw).trim_end();
        if line.trim().is_empty() {
            continue;
        }
        let (key_text, vec_text) = line
            .split_once('\t')
            .ok_or_else(|| malformed(line_no, "expected 'key<TAB>vector'".to_string()))?;
        let key = LocalKey::parse(node_type, key_text)
            .map_err(|e| malformed(line_no, e.to_string()))?;
        let vector = vec_text
            .split_whitespace()
            .map(|v| match v.parse::<f32>() {
                Ok(x) if x.is_finite() => Ok(x),
                Ok(_) => Err(format!("non-finite value '{}'", v)),
                Err(e) => Err(format!("invalid float '{}': {}", v, e)),
            })
            .collect::<Result<Vec<f32>, _>>()
            .map_err(|reason| malformed(line_no, reason))?;
        if vector.is_empty() {
            return Err(malformed(line_no, "empty vector".to_string()));
        }
        match dim {
            Some(d) if d != vector.len() => {
                return Err(malformed(
                    line_no,
                    format!("expected dimension {}, got {}", d, vector.len()),
                ));
            }
            Some(_) => {}
            None => dim = Some(vector.len()),
        }
        if table.insert(key.clone(), vector).is_some() {
            return Err(malformed(line_no, format!("duplicate key '{}'", key)));
        }
    }
    debug!(path = %path.display(), vectors = table.len(), "Parsed trainer output");
    Ok(table)
}
