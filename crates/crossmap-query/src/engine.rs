//! Cosine nearest-neighbor queries over a loaded embedding table.

use crossmap_core::{NodeId, NodeType};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::QueryConfig;
use crate::dictionary::NodeDictionary;
use crate::error::{QueryError, QueryResult};
use crate::table::EmbeddingTable;

/// Cosine similarity of two vectors; `0.0` when either has zero norm.
///
/// Extra components of the longer vector are ignored.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// One query result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Neighbor {
    pub global_id: NodeId,
    pub node_type: NodeType,
    pub value: String,
    pub similarity: f32,
}

/// Dictionary plus embedding table, built once and queried many times.
#[derive(Debug, Clone)]
pub struct QueryEngine {
    dictionary: NodeDictionary,
    table: EmbeddingTable,
}

impl QueryEngine {
    /// Load the dictionary and embedding file named in `config`.
    pub fn load(config: &QueryConfig) -> QueryResult<Self> {
        config.validate()?;
        let dictionary = NodeDictionary::load(&config.node_dict_path)?;
        let table = EmbeddingTable::load(
            &config.embedding_path,
            dictionary.row_count(),
            config.embed_dim,
            config.placeholder_seed,
        )?;
        info!(
            records = dictionary.len(),
            rows = table.rows(),
            placeholders = table.placeholder_count(),
            dim = table.dim(),
            "Query engine loaded"
        );
        Self::from_parts(dictionary, table)
    }

    /// Combine an already loaded dictionary and table.
    ///
    /// The table must have a row for every global id of the dictionary.
    pub fn from_parts(dictionary: NodeDictionary, table: EmbeddingTable) -> QueryResult<Self> {
        if table.rows() < dictionary.row_count() {
            return Err(QueryError::InvalidConfig(format!(
                "embedding table has {} rows, dictionary needs {}",
                table.rows(),
                dictionary.row_count()
            )));
        }
        Ok(Self { dictionary, table })
    }

    pub fn dictionary(&self) -> &NodeDictionary {
        &self.dictionary
    }

    pub fn table(&self) -> &EmbeddingTable {
        &self.table
    }

    /// Vector of the node whose value is `query`.
    pub fn vector_of(&self, query: &str) -> QueryResult<&[f32]> {
        let id = self
            .dictionary
            .resolve(query)
            .ok_or_else(|| QueryError::UnknownQuery(query.to_string()))?;
        self.row(id)
    }

    fn row(&self, id: NodeId) -> QueryResult<&[f32]> {
        // from_parts guarantees a row for every dictionary id
        self.table.row(id as usize).ok_or_else(|| {
            QueryError::InvalidConfig(format!("no embedding row for global id {}", id))
        })
    }

    /// The `k` nodes of `target_type` most similar to `query`, most similar first.
    ///
    /// Equal similarities keep dictionary order. The query node itself is a
    /// candidate when it has the target type.
    pub fn neighbors(
        &self,
        query: &str,
        target_type: NodeType,
        k: usize,
    ) -> QueryResult<Vec<Neighbor>> {
        let query_vec = self.vector_of(query)?;
        let candidates = self.dictionary.candidates(target_type);

        let mut scored = Vec::with_capacity(candidates.len());
        for &id in candidates {
            scored.push((id, cosine_similarity(query_vec, self.row(id)?)));
        }
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(k);

        debug!(
            query,
            target_type = %target_type,
            candidates = candidates.len(),
            returned = scored.len(),
            "Answered neighbor query"
        );

        Ok(scored
            .into_iter()
            .filter_map(|(id, similarity)| {
                self.dictionary.attributes(id).map(|attrs| Neighbor {
                    global_id: id,
                    node_type: attrs.node_type,
                    value: attrs.value.clone(),
                    similarity,
                })
            })
            .collect())
    }
}
