//! Dense adjacency matrices for single edge relations.
//!
//! Row `r` / column `c` of the matrix for edge type `(s, d)` hold the weight
//! between local id `r` of type `s` and local id `c` of type `d`. Cells with
//! no edge are 0.

use crossmap_core::EdgeType;
use ndarray::Array2;

use crate::config::Normalization;
use crate::error::{GraphError, GraphResult};
use crate::model::TypedGraph;

impl TypedGraph {
    /// Matrix shape `(|src nodes|, |dst nodes|)` of an edge type.
    pub fn matrix_shape(&self, edge_type: EdgeType) -> GraphResult<(usize, usize)> {
        Ok((
            self.require_nodes(edge_type.src)?.len(),
            self.require_nodes(edge_type.dst)?.len(),
        ))
    }

    /// Dense adjacency matrix of `edge_type`; weights are copied unmodified.
    ///
    /// # Errors
    /// - `UnknownNodeType` if either endpoint type has no nodes
    /// - `UnknownKey` if the relation references a key outside its node table
    pub fn build_matrix(&self, edge_type: EdgeType) -> GraphResult<Array2<f64>> {
        let src_table = self.require_nodes(edge_type.src)?;
        let dst_table = self.require_nodes(edge_type.dst)?;
        let mut matrix = Array2::zeros((src_table.len(), dst_table.len()));

        let Some(relation) = self.relation(edge_type) else {
            return Ok(matrix);
        };
        for (s, row) in relation {
            let r = src_table.local_id(s).ok_or_else(|| GraphError::UnknownKey {
                node_type: edge_type.src,
                key: s.clone(),
            })?;
            for (t, &weight) in row {
                let c = dst_table.local_id(t).ok_or_else(|| GraphError::UnknownKey {
                    node_type: edge_type.dst,
                    key: t.clone(),
                })?;
                matrix[[r, c]] = weight;
            }
        }
        Ok(matrix)
    }

    /// [`build_matrix`](Self::build_matrix) followed by the requested normalization pass.
    pub fn build_matrix_with(
        &self,
        edge_type: EdgeType,
        normalization: Normalization,
    ) -> GraphResult<Array2<f64>> {
        let mut matrix = self.build_matrix(edge_type)?;
        normalize(&mut matrix, normalization);
        Ok(matrix)
    }
}

/// Apply a normalization pass in place.
pub fn normalize(matrix: &mut Array2<f64>, normalization: Normalization) {
    match normalization {
        Normalization::None => {}
        Normalization::L1 => row_normalize(matrix),
    }
}

/// L1 row normalization: each row with a non-zero sum is scaled to sum to 1.
/// All-zero rows are left as they are.
pub fn row_normalize(matrix: &mut Array2<f64>) {
    for mut row in matrix.rows_mut() {
        let sum: f64 = row.iter().map(|w| w.abs()).sum();
        if sum > 0.0 {
            row.mapv_inplace(|w| w / sum);
        }
    }
}
