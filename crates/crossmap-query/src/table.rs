//! Dense embedding table indexed by global id.
//!
//! Every row exists. Rows the embedding file does not mention hold a
//! placeholder vector drawn uniformly from `[0, 1)`; they keep queries total
//! but carry no meaning. [`EmbeddingTable::is_placeholder`] tells them apart.

use std::fs;
use std::path::Path;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::warn;

use crate::error::{QueryError, QueryResult};

/// Row-major `rows × dim` matrix of `f32`.
#[derive(Debug, Clone)]
pub struct EmbeddingTable {
    dim: usize,
    data: Vec<f32>,
    placeholder: Vec<bool>,
}

impl EmbeddingTable {
    /// A table whose rows are all placeholders.
    ///
    /// # Errors
    /// `InvalidConfig` when `rows × dim` overflows or cannot be allocated.
    pub fn with_placeholders(rows: usize, dim: usize, seed: Option<u64>) -> QueryResult<Self> {
        let too_large = || {
            QueryError::InvalidConfig(format!(
                "embedding table of {} rows x {} dimensions is too large",
                rows, dim
            ))
        };
        let len = rows.checked_mul(dim).ok_or_else(too_large)?;
        let mut data = Vec::new();
        data.try_reserve_exact(len).map_err(|_| too_large())?;
        let mut placeholder = Vec::new();
        placeholder.try_reserve_exact(rows).map_err(|_| too_large())?;

        let mut rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        data.extend((0..len).map(|_| rng.gen::<f32>()));
        placeholder.resize(rows, true);
        Ok(Self {
            dim,
            data,
            placeholder,
        })
    }

    /// Load `rowIndex v1 .. vd` records on top of a placeholder table.
    ///
    /// The row index may be written as an integral float (`3.0`). A later
    /// record for the same row overwrites an earlier one.
    ///
    /// # Errors
    /// `Format` on the first record with a bad row index, a row index
    /// outside `rows`, a bad or non-finite float or a vector length other
    /// than `dim`.
    pub fn load(
        path: impl AsRef<Path>,
        rows: usize,
        dim: usize,
        seed: Option<u64>,
    ) -> QueryResult<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let mut table = Self::with_placeholders(rows, dim, seed)?;

        for (idx, line) in contents.lines().enumerate() {
            let mut fields = line.split_whitespace();
            let Some(first) = fields.next() else {
                continue;
            };
            let format_error = |reason: String| QueryError::Format {
                path: path.display().to_string(),
                line: idx + 1,
                reason,
            };
            let row = parse_row_index(first).map_err(&format_error)?;
            if row >= rows {
                return Err(format_error(format!(
                    "row index {} outside table of {} rows",
                    row, rows
                )));
            }
            let vector = fields
                .map(parse_component)
                .collect::<Result<Vec<f32>, _>>()
                .map_err(&format_error)?;
            if vector.len() != dim {
                return Err(format_error(format!(
                    "expected {} values, got {}",
                    dim,
                    vector.len()
                )));
            }
            if !table.placeholder[row] {
                warn!(path = %path.display(), row, "Row listed twice, keeping the later vector");
            }
            table.set_row(row, &vector);
        }
        Ok(table)
    }

    fn set_row(&mut self, row: usize, vector: &[f32]) {
        let start = row * self.dim;
        self.data[start..start + self.dim].copy_from_slice(vector);
        self.placeholder[row] = false;
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn rows(&self) -> usize {
        self.placeholder.len()
    }

    pub fn row(&self, row: usize) -> Option<&[f32]> {
        if row >= self.rows() {
            return None;
        }
        let start = row * self.dim;
        Some(&self.data[start..start + self.dim])
    }

    /// True when the row was never loaded from the embedding file.
    pub fn is_placeholder(&self, row: usize) -> bool {
        self.placeholder.get(row).copied().unwrap_or(false)
    }

    pub fn placeholder_count(&self) -> usize {
        self.placeholder.iter().filter(|p| **p).count()
    }
}

fn parse_component(text: &str) -> Result<f32, String> {
    let value: f32 = text
        .parse()
        .map_err(|e| format!("invalid float '{}': {}", text, e))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(format!("non-finite value '{}'", text))
    }
}

fn parse_row_index(text: &str) -> Result<usize, String> {
    if let Ok(row) = text.parse::<usize>() {
        return Ok(row);
    }
    let value: f64 = text
        .parse()
        .map_err(|_| format!("invalid row index '{}'", text))?;
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= usize::MAX as f64 {
        Ok(value as usize)
    } else {
        Err(format!("row index '{}' is not a non-negative integer", text))
    }
}
