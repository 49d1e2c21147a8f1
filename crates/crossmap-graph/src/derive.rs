//! Derived relations via matrix powers.
//!
//! A derived relation replaces a base relation `M` by `M^power` (e.g. the
//! two-hop word-word relation `M^2`). The full product is computed with real
//! arithmetic first; only then are cells below [`DERIVATION_THRESHOLD`]
//! dropped while folding the matrix back into sparse form.

use crossmap_core::EdgeType;
use ndarray::Array2;
use tracing::info;

use crate::config::DerivationSpec;
use crate::error::{GraphError, GraphResult};
use crate::model::{relation_len, EdgeRelation, TypedGraph};

/// Cells of a derived matrix below this value are structurally absent.
///
/// The bound is inclusive: a cell equal to `1e-2` is kept, and only strictly
/// smaller cells are dropped.
pub const DERIVATION_THRESHOLD: f64 = 1e-2;

/// `matrix^power` using standard real matrix multiplication.
///
/// # Errors
/// `InvalidDerivation` if the matrix is not square or `power == 0`.
pub fn matrix_power(
    edge_type: EdgeType,
    matrix: &Array2<f64>,
    power: u32,
) -> GraphResult<Array2<f64>> {
    let (rows, cols) = matrix.dim();
    if rows != cols {
        return Err(GraphError::InvalidDerivation {
            edge_type,
            reason: format!("matrix is {}x{}, not square", rows, cols),
        });
    }
    if power == 0 {
        return Err(GraphError::InvalidDerivation {
            edge_type,
            reason: "power must be >= 1".to_string(),
        });
    }
    let mut result = matrix.clone();
    for _ in 1..power {
        result = result.dot(matrix);
    }
    Ok(result)
}

impl TypedGraph {
    /// Fold a dense matrix back into a sparse relation in local key space.
    ///
    /// Keeps cells `>= DERIVATION_THRESHOLD`; rows/columns map back to keys via
    /// each type's local id → key table.
    pub fn extract_relation(
        &self,
        edge_type: EdgeType,
        matrix: &Array2<f64>,
    ) -> GraphResult<EdgeRelation> {
        let expected = self.matrix_shape(edge_type)?;
        if matrix.dim() != expected {
            return Err(GraphError::ShapeMismatch {
                edge_type,
                expected,
                actual: matrix.dim(),
            });
        }
        let src_keys = self.require_nodes(edge_type.src)?.keys();
        let dst_keys = self.require_nodes(edge_type.dst)?.keys();

        let mut relation = EdgeRelation::new();
        for ((r, c), &weight) in matrix.indexed_iter() {
            if weight >= DERIVATION_THRESHOLD {
                relation
                    .entry(src_keys[r].clone())
                    .or_default()
                    .insert(dst_keys[c].clone(), weight);
            }
        }
        Ok(relation)
    }

    /// Compute the derived relation described by `spec` without modifying the graph.
    pub fn derive_relation(&self, spec: &DerivationSpec) -> GraphResult<EdgeRelation> {
        spec.validate().map_err(|e| GraphError::InvalidDerivation {
            edge_type: spec.edge_type,
            reason: e.to_string(),
        })?;
        let base = self.build_matrix_with(spec.edge_type, spec.normalize)?;
        let derived = matrix_power(spec.edge_type, &base, spec.power)?;
        self.extract_relation(spec.edge_type, &derived)
    }

    /// Apply every derivation, each computed from the relations as they were
    /// before any of them was applied.
    ///
    /// All derived relations are computed before the first swap, so a failure
    /// leaves the graph unchanged.
    pub fn apply_derivations(&mut self, specs: &[DerivationSpec]) -> GraphResult<()> {
        let mut derived = Vec::with_capacity(specs.len());
        for spec in specs {
            let relation = self.derive_relation(spec)?;
            info!(
                edge_type = %spec.edge_type,
                power = spec.power,
                before = self.relation(spec.edge_type).map(relation_len).unwrap_or(0),
                after = relation_len(&relation),
                "Derived relation"
            );
            derived.push((spec.edge_type, relation));
        }
        for (edge_type, relation) in derived {
            self.replace_relation(edge_type, relation)?;
        }
        Ok(())
    }
}
