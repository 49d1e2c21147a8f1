//! Node dictionary: global id ↔ (type, local id, value).

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use crossmap_core::source::strip_line_terminator;
use crossmap_core::{DictionaryRecord, NodeAttributes, NodeId, NodeType};
use tracing::debug;

use crate::error::{QueryError, QueryResult};

/// Largest global id a dictionary may hold. Ids index dense embedding rows.
pub const MAX_GLOBAL_ID: NodeId = u32::MAX as NodeId;

/// Lookup tables built from a node dictionary file.
///
/// Candidates of each type keep file order. When several records share a
/// value, the last one wins the value → id mapping.
#[derive(Debug, Clone, Default)]
pub struct NodeDictionary {
    attributes: HashMap<NodeId, NodeAttributes>,
    by_value: HashMap<String, NodeId>,
    by_type: BTreeMap<NodeType, Vec<NodeId>>,
    max_id: Option<NodeId>,
}

impl NodeDictionary {
    /// Read a dictionary file, failing on the first malformed or duplicate record.
    pub fn load(path: impl AsRef<Path>) -> QueryResult<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let mut dictionary = Self::default();
        for (idx, raw) in contents.split_inclusive('\n').enumerate() {
            let line = strip_line_terminator(raw);
            if line.trim().is_empty() {
                continue;
            }
            let format_error = |reason: String| QueryError::Format {
                path: path.display().to_string(),
                line: idx + 1,
                reason,
            };
            let record = DictionaryRecord::parse(line).map_err(&format_error)?;
            dictionary.insert(record).map_err(&format_error)?;
        }
        debug!(
            path = %path.display(),
            records = dictionary.len(),
            "Loaded node dictionary"
        );
        Ok(dictionary)
    }

    pub fn from_records(records: impl IntoIterator<Item = DictionaryRecord>) -> QueryResult<Self> {
        let mut dictionary = Self::default();
        for record in records {
            dictionary.insert(record).map_err(QueryError::InvalidConfig)?;
        }
        Ok(dictionary)
    }

    fn insert(&mut self, record: DictionaryRecord) -> Result<(), String> {
        let DictionaryRecord {
            global_id,
            attributes,
        } = record;
        if global_id > MAX_GLOBAL_ID {
            return Err(format!(
                "global id {} exceeds the largest supported id {}",
                global_id, MAX_GLOBAL_ID
            ));
        }
        if self.attributes.contains_key(&global_id) {
            return Err(format!("duplicate global id {}", global_id));
        }
        self.by_value.insert(attributes.value.clone(), global_id);
        self.by_type
            .entry(attributes.node_type)
            .or_default()
            .push(global_id);
        self.max_id = Some(self.max_id.map_or(global_id, |m| m.max(global_id)));
        self.attributes.insert(global_id, attributes);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Rows an embedding table needs so that every global id is a valid row.
    pub fn row_count(&self) -> usize {
        let span = self.max_id.map_or(0, |m| (m as usize).saturating_add(1));
        span.max(self.len())
    }

    pub fn resolve(&self, value: &str) -> Option<NodeId> {
        self.by_value.get(value).copied()
    }

    pub fn attributes(&self, id: NodeId) -> Option<&NodeAttributes> {
        self.attributes.get(&id)
    }

    /// Global ids of one type in file order.
    pub fn candidates(&self, node_type: NodeType) -> &[NodeId] {
        self.by_type
            .get(&node_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn node_types(&self) -> Vec<NodeType> {
        self.by_type.keys().copied().collect()
    }
}
