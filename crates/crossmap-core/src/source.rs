//! Dataset loader interface and an in-memory implementation.
//!
//! A [`GraphSource`] exposes the three mappings a typed graph is built from:
//! node type → global ids, global id → [`NodeAttributes`], and edge type →
//! `(global src, global dst) → weight`.
//!
//! # File formats
//!
//! Node dictionary: one record per line, fields separated by `0x01`:
//! `globalId, type, typeLocalId, value`.
//!
//! Edge list: one record per line, tab-separated:
//! `edgeType, srcGlobalId, dstGlobalId, weight`.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::{CoreError, CoreResult};
use crate::types::{EdgeType, NodeId, NodeType};

/// Field separator of node dictionary records.
pub const FIELD_SEPARATOR: char = '\u{1}';

/// Attributes recorded for one global node id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeAttributes {
    pub node_type: NodeType,
    pub local_id: usize,
    pub value: String,
}

// ============================================================================
// DICTIONARY RECORD
// ============================================================================

/// One line of a node dictionary file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryRecord {
    pub global_id: NodeId,
    pub attributes: NodeAttributes,
}

impl DictionaryRecord {
    /// Parse one record. The caller strips the line terminator.
    ///
    /// Returns the failure reason; callers attach path and line number.
    pub fn parse(line: &str) -> Result<Self, String> {
        let fields: Vec<&str> = line.splitn(4, FIELD_SEPARATOR).collect();
        if fields.len() != 4 {
            return Err(format!(
                "expected 4 fields separated by 0x01, got {}",
                fields.len()
            ));
        }
        let global_id = fields[0]
            .trim()
            .parse::<NodeId>()
            .map_err(|e| format!("invalid global id '{}': {}", fields[0], e))?;
        let node_type = fields[1]
            .trim()
            .parse::<NodeType>()
            .map_err(|e| e.to_string())?;
        let local_id = fields[2]
            .trim()
            .parse::<usize>()
            .map_err(|e| format!("invalid local id '{}': {}", fields[2], e))?;
        Ok(Self {
            global_id,
            attributes: NodeAttributes {
                node_type,
                local_id,
                value: fields[3].to_string(),
            },
        })
    }

    /// Render as a dictionary line (without terminator).
    pub fn to_line(&self) -> String {
        format!(
            "{}{sep}{}{sep}{}{sep}{}",
            self.global_id,
            self.attributes.node_type.code(),
            self.attributes.local_id,
            self.attributes.value,
            sep = FIELD_SEPARATOR
        )
    }
}

/// Strip a trailing `\n` / `\r\n` without touching other whitespace.
pub fn strip_line_terminator(line: &str) -> &str {
    line.strip_suffix('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .unwrap_or(line)
}

/// Read every record of a node dictionary file, failing on the first bad line.
pub fn read_dictionary(path: impl AsRef<Path>) -> CoreResult<Vec<DictionaryRecord>> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    let mut records = Vec::new();
    for (idx, raw) in contents.split_inclusive('\n').enumerate() {
        let line = strip_line_terminator(raw);
        if line.trim().is_empty() {
            continue;
        }
        let record = DictionaryRecord::parse(line).map_err(|reason| CoreError::Format {
            path: path.display().to_string(),
            line: idx + 1,
            reason,
        })?;
        records.push(record);
    }
    Ok(records)
}

// ============================================================================
// GRAPH SOURCE
// ============================================================================

/// Read-only view of a dataset, as produced by an external loader.
pub trait GraphSource {
    /// Node types that have an id list, in stable order.
    fn node_types(&self) -> Vec<NodeType>;

    /// Global ids listed under `node_type`.
    fn nodes_of_type(&self, node_type: NodeType) -> &[NodeId];

    /// Attributes of a global id, if recorded.
    fn node_attributes(&self, id: NodeId) -> Option<&NodeAttributes>;

    /// Edge types that carry a relation, in stable order.
    fn edge_types(&self) -> Vec<EdgeType>;

    /// Weighted edges of one edge type keyed by global ids.
    fn edges_of_type(&self, edge_type: EdgeType) -> Option<&BTreeMap<(NodeId, NodeId), f64>>;
}

/// Dataset held fully in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    node_type: BTreeMap<NodeType, Vec<NodeId>>,
    node_dict: HashMap<NodeId, NodeAttributes>,
    et2net: BTreeMap<EdgeType, BTreeMap<(NodeId, NodeId), f64>>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a node and list it under its type.
    pub fn add_node(
        &mut self,
        id: NodeId,
        node_type: NodeType,
        local_id: usize,
        value: impl Into<String>,
    ) -> &mut Self {
        self.list_node(node_type, id);
        self.node_dict.insert(
            id,
            NodeAttributes {
                node_type,
                local_id,
                value: value.into(),
            },
        );
        self
    }

    /// List a global id under a type without recording its attributes.
    pub fn list_node(&mut self, node_type: NodeType, id: NodeId) -> &mut Self {
        let ids = self.node_type.entry(node_type).or_default();
        if !ids.contains(&id) {
            ids.push(id);
        }
        self
    }

    /// Set the weight of one edge. A repeated (src, dst) pair replaces the weight.
    pub fn add_edge(
        &mut self,
        edge_type: EdgeType,
        src: NodeId,
        dst: NodeId,
        weight: f64,
    ) -> &mut Self {
        self.et2net
            .entry(edge_type)
            .or_default()
            .insert((src, dst), weight);
        self
    }

    /// Total number of recorded nodes.
    pub fn node_count(&self) -> usize {
        self.node_dict.len()
    }

    /// Total number of edges across all edge types.
    pub fn edge_count(&self) -> usize {
        self.et2net.values().map(BTreeMap::len).sum()
    }

    /// Load from a node dictionary and an edge list file.
    pub fn from_files(node_dict: impl AsRef<Path>, edges: impl AsRef<Path>) -> CoreResult<Self> {
        let mut source = Self::new();
        for record in read_dictionary(node_dict.as_ref())? {
            let attrs = record.attributes;
            source.add_node(record.global_id, attrs.node_type, attrs.local_id, attrs.value);
        }

        let edges = edges.as_ref();
        let contents = fs::read_to_string(edges)?;
        for (idx, line) in contents.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let (et, src, dst, weight) =
                parse_edge_line(line).map_err(|reason| CoreError::Format {
                    path: edges.display().to_string(),
                    line: idx + 1,
                    reason,
                })?;
            source.add_edge(et, src, dst, weight);
        }

        info!(
            nodes = source.node_count(),
            edges = source.edge_count(),
            "Loaded graph source from {} and {}",
            node_dict.as_ref().display(),
            edges.display()
        );
        Ok(source)
    }
}

fn parse_edge_line(line: &str) -> Result<(EdgeType, NodeId, NodeId, f64), String> {
    let fields: Vec<&str> = line.split('\t').map(str::trim).collect();
    if fields.len() != 4 {
        return Err(format!(
            "expected 4 tab-separated fields, got {}",
            fields.len()
        ));
    }
    let et = fields[0].parse::<EdgeType>().map_err(|e| e.to_string())?;
    let src = fields[1]
        .parse::<NodeId>()
        .map_err(|e| format!("invalid source id '{}': {}", fields[1], e))?;
    let dst = fields[2]
        .parse::<NodeId>()
        .map_err(|e| format!("invalid destination id '{}': {}", fields[2], e))?;
    let weight = fields[3]
        .parse::<f64>()
        .map_err(|e| format!("invalid weight '{}': {}", fields[3], e))?;
    Ok((et, src, dst, weight))
}

impl GraphSource for InMemorySource {
    fn node_types(&self) -> Vec<NodeType> {
        self.node_type.keys().copied().collect()
    }

    fn nodes_of_type(&self, node_type: NodeType) -> &[NodeId] {
        self.node_type
            .get(&node_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn node_attributes(&self, id: NodeId) -> Option<&NodeAttributes> {
        self.node_dict.get(&id)
    }

    fn edge_types(&self) -> Vec<EdgeType> {
        self.et2net.keys().copied().collect()
    }

    fn edges_of_type(&self, edge_type: EdgeType) -> Option<&BTreeMap<(NodeId, NodeId), f64>> {
        self.et2net.get(&edge_type)
    }
}
