//! Typed graph model: nodes partitioned by type, edges partitioned by edge type.
//!
//! Built once from a [`GraphSource`]. Every global-id edge is translated into
//! the local key space of its endpoint types. After construction the only
//! mutation is [`TypedGraph::replace_relation`].

use std::collections::{BTreeMap, HashMap};

use crossmap_core::{EdgeType, GraphSource, LocalKey, NodeId, NodeType};
use tracing::{debug, info};

use crate::error::{GraphError, GraphResult};

/// Sparse weighted relation: local src → local dst → weight.
pub type EdgeRelation = BTreeMap<LocalKey, BTreeMap<LocalKey, f64>>;

/// Number of (src, dst) pairs in a relation.
pub fn relation_len(relation: &EdgeRelation) -> usize {
    relation.values().map(BTreeMap::len).sum()
}

// ============================================================================
// NODE TABLE
// ============================================================================

/// All nodes of one type, indexed by dense local id.
#[derive(Debug, Clone)]
pub struct NodeTable {
    node_type: NodeType,
    keys: Vec<LocalKey>,
    global_ids: Vec<NodeId>,
    values: Vec<String>,
    index: HashMap<LocalKey, usize>,
}

impl NodeTable {
    /// Build from `(local_id, global_id, value)` entries.
    ///
    /// Local ids must be exactly `0..entries.len()` and keys must be unique.
    /// Literal keys may not contain `\t`, `\n` or `\r`: the trainer reads
    /// them back from `key<TAB>vector` lines.
    pub fn from_entries(
        node_type: NodeType,
        entries: Vec<(usize, NodeId, String)>,
    ) -> GraphResult<Self> {
        let count = entries.len();
        let mut slots: Vec<Option<(NodeId, String)>> = vec![None; count];
        for (local_id, global_id, value) in entries {
            let slot = slots.get_mut(local_id).ok_or(GraphError::LocalIdOutOfRange {
                node_type,
                local_id,
                count,
            })?;
            if slot.is_some() {
                return Err(GraphError::DuplicateLocalId {
                    node_type,
                    local_id,
                });
            }
            *slot = Some((global_id, value));
        }

        let mut table = Self {
            node_type,
            keys: Vec::with_capacity(count),
            global_ids: Vec::with_capacity(count),
            values: Vec::with_capacity(count),
            index: HashMap::with_capacity(count),
        };
        // `count` entries, no duplicates, all < count: every slot is filled.
        for (local_id, (global_id, value)) in slots.into_iter().flatten().enumerate() {
            let key = LocalKey::for_node(node_type, local_id, &value);
            if let LocalKey::Literal(text) = &key {
                if has_line_break_or_tab(text) {
                    return Err(GraphError::UnwritableKey {
                        node_type,
                        key: text.clone(),
                    });
                }
            }
            if table.index.insert(key.clone(), local_id).is_some() {
                return Err(GraphError::DuplicateKey { node_type, key });
            }
            table.keys.push(key);
            table.global_ids.push(global_id);
            table.values.push(value);
        }
        Ok(table)
    }

    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Keys in local id order.
    pub fn keys(&self) -> &[LocalKey] {
        &self.keys
    }

    pub fn key(&self, local_id: usize) -> Option<&LocalKey> {
        self.keys.get(local_id)
    }

    pub fn local_id(&self, key: &LocalKey) -> Option<usize> {
        self.index.get(key).copied()
    }

    pub fn contains(&self, key: &LocalKey) -> bool {
        self.index.contains_key(key)
    }

    pub fn global_id(&self, local_id: usize) -> Option<NodeId> {
        self.global_ids.get(local_id).copied()
    }

    pub fn value(&self, local_id: usize) -> Option<&str> {
        self.values.get(local_id).map(String::as_str)
    }

    /// `(local_id, key, global_id, value)` in local id order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &LocalKey, NodeId, &str)> + '_ {
        self.keys
            .iter()
            .zip(&self.global_ids)
            .zip(&self.values)
            .enumerate()
            .map(|(i, ((k, g), v))| (i, k, *g, v.as_str()))
    }
}

// ============================================================================
// TYPED GRAPH
// ============================================================================

/// Heterogeneous graph in local key space.
#[derive(Debug, Clone, Default)]
pub struct TypedGraph {
    nodes: BTreeMap<NodeType, NodeTable>,
    edges: BTreeMap<EdgeType, EdgeRelation>,
}

/// True when `text` cannot be one field of a tab-separated line.
pub fn has_line_break_or_tab(text: &str) -> bool {
    text.contains(|c| matches!(c, '\t' | '\n' | '\r'))
}

impl TypedGraph {
    /// Build from a dataset loader.
    ///
    /// # Errors
    /// - `MissingNode` if a listed id or edge endpoint has no attributes
    /// - `NodeTypeMismatch` / `EdgeEndpointMismatch` if recorded types disagree
    /// - `DuplicateLocalId` / `LocalIdOutOfRange` / `DuplicateKey` for a broken id space
    /// - `UnwritableKey` for a word or category value with a tab or line break
    /// - `InvalidWeight` for negative or non-finite weights
    pub fn from_source<S: GraphSource + ?Sized>(source: &S) -> GraphResult<Self> {
        let mut nodes = BTreeMap::new();
        for node_type in source.node_types() {
            let mut entries = Vec::new();
            for &id in source.nodes_of_type(node_type) {
                let attrs = source
                    .node_attributes(id)
                    .ok_or(GraphError::MissingNode { id })?;
                if attrs.node_type != node_type {
                    return Err(GraphError::NodeTypeMismatch {
                        id,
                        expected: node_type,
                        actual: attrs.node_type,
                    });
                }
                entries.push((attrs.local_id, id, attrs.value.clone()));
            }
            let table = NodeTable::from_entries(node_type, entries)?;
            debug!(node_type = %node_type, count = table.len(), "Built node table");
            nodes.insert(node_type, table);
        }

        let mut graph = Self {
            nodes,
            edges: BTreeMap::new(),
        };

        for edge_type in source.edge_types() {
            let Some(net) = source.edges_of_type(edge_type) else {
                continue;
            };
            let mut relation = EdgeRelation::new();
            for (&(src, dst), &weight) in net {
                check_weight(edge_type, weight)?;
                let s = graph.endpoint_key(source, edge_type, edge_type.src, src)?;
                let t = graph.endpoint_key(source, edge_type, edge_type.dst, dst)?;
                relation.entry(s).or_default().insert(t, weight);
            }
            graph.edges.insert(edge_type, relation);
        }

        info!(
            node_types = graph.nodes.len(),
            nodes = graph.node_count(),
            edge_types = graph.edges.len(),
            edges = graph.edge_count(),
            "Typed graph constructed"
        );
        Ok(graph)
    }

    fn endpoint_key<S: GraphSource + ?Sized>(
        &self,
        source: &S,
        edge_type: EdgeType,
        node_type: NodeType,
        id: NodeId,
    ) -> GraphResult<LocalKey> {
        let attrs = source
            .node_attributes(id)
            .ok_or(GraphError::MissingNode { id })?;
        if attrs.node_type != node_type {
            return Err(GraphError::EdgeEndpointMismatch {
                edge_type,
                id,
                actual: attrs.node_type,
            });
        }
        let key = LocalKey::for_node(node_type, attrs.local_id, &attrs.value);
        let listed = self.nodes.get(&node_type).and_then(|table| {
            table
                .local_id(&key)
                .and_then(|local_id| table.global_id(local_id))
        });
        if listed != Some(id) {
            return Err(GraphError::UnlistedNode { id, node_type });
        }
        Ok(key)
    }

    /// Node types present, in code order.
    pub fn node_types(&self) -> Vec<NodeType> {
        self.nodes.keys().copied().collect()
    }

    /// Node table of a type.
    pub fn nodes(&self, node_type: NodeType) -> Option<&NodeTable> {
        self.nodes.get(&node_type)
    }

    /// Node table of a type, failing if absent.
    pub fn require_nodes(&self, node_type: NodeType) -> GraphResult<&NodeTable> {
        self.nodes
            .get(&node_type)
            .ok_or(GraphError::UnknownNodeType(node_type))
    }

    /// Edge types that carry a relation.
    pub fn edge_types(&self) -> Vec<EdgeType> {
        self.edges.keys().copied().collect()
    }

    pub fn relation(&self, edge_type: EdgeType) -> Option<&EdgeRelation> {
        self.edges.get(&edge_type)
    }

    /// Weight of one edge, 0 when absent.
    pub fn weight(&self, edge_type: EdgeType, src: &LocalKey, dst: &LocalKey) -> f64 {
        self.edges
            .get(&edge_type)
            .and_then(|rel| rel.get(src))
            .and_then(|row| row.get(dst))
            .copied()
            .unwrap_or(0.0)
    }

    /// Total number of nodes across types.
    pub fn node_count(&self) -> usize {
        self.nodes.values().map(NodeTable::len).sum()
    }

    /// Total number of edges across edge types.
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(relation_len).sum()
    }

    /// Swap the stored relation of `edge_type`, returning the previous one.
    ///
    /// The new relation is validated completely before the swap: both endpoint
    /// types must exist, every key must belong to its node table, and every
    /// weight must be finite and non-negative.
    pub fn replace_relation(
        &mut self,
        edge_type: EdgeType,
        relation: EdgeRelation,
    ) -> GraphResult<Option<EdgeRelation>> {
        let src_table = self.require_nodes(edge_type.src)?;
        let dst_table = self.require_nodes(edge_type.dst)?;
        for (s, row) in &relation {
            if !src_table.contains(s) {
                return Err(GraphError::UnknownKey {
                    node_type: edge_type.src,
                    key: s.clone(),
                });
            }
            for (t, &weight) in row {
                if !dst_table.contains(t) {
                    return Err(GraphError::UnknownKey {
                        node_type: edge_type.dst,
                        key: t.clone(),
                    });
                }
                check_weight(edge_type, weight)?;
            }
        }
        debug!(
            edge_type = %edge_type,
            edges = relation_len(&relation),
            "Replacing relation"
        );
        Ok(self.edges.insert(edge_type, relation))
    }
}

fn check_weight(edge_type: EdgeType, weight: f64) -> GraphResult<()> {
    if weight.is_finite() && weight >= 0.0 {
        Ok(())
    } else {
        Err(GraphError::InvalidWeight { edge_type, weight })
    }
}
