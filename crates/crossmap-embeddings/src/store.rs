//! In-memory vector store.
//!
//! Holds the latest center and context vector tables per node type. An update
//! replaces the whole table of every type it names and leaves other types
//! alone. Readers get `Arc` snapshots, so a reader never sees a half-replaced
//! table.

use std::collections::HashMap;
use std::sync::Arc;

use crossmap_core::{LocalKey, NodeType};
use parking_lot::RwLock;
use tracing::info;

use crate::gateway::TrainedVectors;
use crate::interchange::{VectorKind, VectorTable};

#[derive(Debug, Default)]
struct StoreInner {
    center: HashMap<NodeType, Arc<VectorTable>>,
    context: HashMap<NodeType, Arc<VectorTable>>,
    generation: u64,
}

impl StoreInner {
    fn tables(&self, kind: VectorKind) -> &HashMap<NodeType, Arc<VectorTable>> {
        match kind {
            VectorKind::Center => &self.center,
            VectorKind::Context => &self.context,
        }
    }
}

/// Shared handle to the current vectors. Clones share the same storage.
#[derive(Debug, Clone, Default)]
pub struct VectorStore {
    inner: Arc<RwLock<StoreInner>>,
}

impl VectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the tables of every type present in `center` or `context`.
    ///
    /// Returns the store generation after the update.
    pub fn update(
        &self,
        center: HashMap<NodeType, VectorTable>,
        context: HashMap<NodeType, VectorTable>,
    ) -> u64 {
        let mut inner = self.inner.write();
        let replaced_center = center.len();
        let replaced_context = context.len();
        for (node_type, table) in center {
            inner.center.insert(node_type, Arc::new(table));
        }
        for (node_type, table) in context {
            inner.context.insert(node_type, Arc::new(table));
        }
        inner.generation += 1;
        info!(
            generation = inner.generation,
            center_types = replaced_center,
            context_types = replaced_context,
            "Vector store updated"
        );
        inner.generation
    }

    pub fn update_from(&self, vectors: TrainedVectors) -> u64 {
        self.update(vectors.center, vectors.context)
    }

    pub fn center(&self, node_type: NodeType, key: &LocalKey) -> Option<Vec<f32>> {
        self.vector(node_type, VectorKind::Center, key)
    }

    pub fn context(&self, node_type: NodeType, key: &LocalKey) -> Option<Vec<f32>> {
        self.vector(node_type, VectorKind::Context, key)
    }

    fn vector(&self, node_type: NodeType, kind: VectorKind, key: &LocalKey) -> Option<Vec<f32>> {
        self.inner
            .read()
            .tables(kind)
            .get(&node_type)
            .and_then(|table| table.get(key))
            .cloned()
    }

    /// The current table for one type, unaffected by later updates.
    pub fn snapshot(&self, node_type: NodeType, kind: VectorKind) -> Option<Arc<VectorTable>> {
        self.inner.read().tables(kind).get(&node_type).cloned()
    }

    /// Types with center vectors, sorted.
    pub fn types(&self) -> Vec<NodeType> {
        let mut types: Vec<NodeType> = self.inner.read().center.keys().copied().collect();
        types.sort();
        types
    }

    pub fn table_len(&self, node_type: NodeType, kind: VectorKind) -> usize {
        self.inner
            .read()
            .tables(kind)
            .get(&node_type)
            .map_or(0, |t| t.len())
    }

    /// Number of updates applied so far.
    pub fn generation(&self) -> u64 {
        self.inner.read().generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(entries: &[(&str, f32)]) -> VectorTable {
        entries
            .iter()
            .map(|(k, v)| (LocalKey::from(*k), vec![*v, *v]))
            .collect()
    }

    #[test]
    fn test_empty_store() {
        let store = VectorStore::new();
        assert_eq!(store.generation(), 0);
        assert!(store.types().is_empty());
        assert!(store.center(NodeType::Word, &LocalKey::from("beach")).is_none());
    }

    #[test]
    fn test_update_replaces_whole_table() {
        let store = VectorStore::new();
        let mut center = HashMap::new();
        center.insert(NodeType::Word, table(&[("beach", 1.0), ("mall", 2.0)]));
        store.update(center, HashMap::new());

        let mut center = HashMap::new();
        center.insert(NodeType::Word, table(&[("beach", 3.0)]));
        assert_eq!(store.update(center, HashMap::new()), 2);

        let beach = LocalKey::from("beach");
        assert_eq!(store.center(NodeType::Word, &beach), Some(vec![3.0, 3.0]));
        // no merging with the previous table
        assert!(store.center(NodeType::Word, &LocalKey::from("mall")).is_none());
        assert_eq!(store.table_len(NodeType::Word, VectorKind::Center), 1);
    }

    #[test]
    fn test_update_keeps_other_types() {
        let store = VectorStore::new();
        let mut center = HashMap::new();
        center.insert(NodeType::Word, table(&[("beach", 1.0)]));
        store.update(center, HashMap::new());

        let mut center = HashMap::new();
        let mut tweets = VectorTable::new();
        tweets.insert(LocalKey::Index(0), vec![0.0, 1.0]);
        center.insert(NodeType::Tweet, tweets);
        store.update(center, HashMap::new());

        assert_eq!(store.types(), vec![NodeType::Tweet, NodeType::Word]);
        assert!(store.center(NodeType::Word, &LocalKey::from("beach")).is_some());
    }

    #[test]
    fn test_snapshot_survives_update_and_clones_share_state() {
        let store = VectorStore::new();
        let reader = store.clone();
        let mut context = HashMap::new();
        context.insert(NodeType::Word, table(&[("beach", 1.0)]));
        store.update(HashMap::new(), context);

        let snap = reader.snapshot(NodeType::Word, VectorKind::Context).unwrap();
        let mut context = HashMap::new();
        context.insert(NodeType::Word, table(&[("sand", 2.0)]));
        store.update(HashMap::new(), context);

        assert!(snap.contains_key(&LocalKey::from("beach")));
        assert!(reader.context(NodeType::Word, &LocalKey::from("sand")).is_some());
        assert_eq!(reader.generation(), 2);
    }
}
