//! Node/edge type algebra and the identifiers that flow between crates.
//!
//! - [`NodeType`]: the fixed alphabet of node categories (`t`, `l`, `w`, `c`)
//! - [`EdgeType`]: an ordered (source, destination) pair of node types
//! - [`LocalKey`]: a node's key inside its own type, either a dense index or a literal value
//! - [`JobId`]: explicit identifier of one trainer invocation
//!
//! Conversions into [`LocalKey`] are always type-directed: index-bearing types
//! (`Tweet`, `Location`) use the type-local id, value-bearing types (`Word`,
//! `Category`) use the node's literal value.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Global node identifier. The only identifier valid across node types.
pub type NodeId = u64;

// ============================================================================
// NODE TYPE
// ============================================================================

/// Node category in the heterogeneous information network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum NodeType {
    /// Tweet (index-bearing).
    Tweet,
    /// Location (index-bearing).
    Location,
    /// Word (value-bearing).
    Word,
    /// Category (value-bearing). Always present in the trainer's fixed file set.
    Category,
}

impl NodeType {
    /// All node types in code order.
    pub const ALL: [NodeType; 4] = [
        NodeType::Tweet,
        NodeType::Location,
        NodeType::Word,
        NodeType::Category,
    ];

    /// Single-letter code used in file names and edge type codes.
    pub fn code(&self) -> char {
        match self {
            NodeType::Tweet => 't',
            NodeType::Location => 'l',
            NodeType::Word => 'w',
            NodeType::Category => 'c',
        }
    }

    /// Parse a single-letter code.
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            't' => Some(NodeType::Tweet),
            'l' => Some(NodeType::Location),
            'w' => Some(NodeType::Word),
            'c' => Some(NodeType::Category),
            _ => None,
        }
    }

    /// Whether nodes of this type are keyed by their literal value rather than their local id.
    pub fn is_value_bearing(&self) -> bool {
        matches!(self, NodeType::Word | NodeType::Category)
    }

    /// Human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            NodeType::Tweet => "tweet",
            NodeType::Location => "location",
            NodeType::Word => "word",
            NodeType::Category => "category",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for NodeType {
    type Err = CoreError;

    /// Accepts either the single-letter code or the full name.
    fn from_str(s: &str) -> CoreResult<Self> {
        let mut chars = s.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if let Some(nt) = NodeType::from_code(c) {
                return Ok(nt);
            }
        }
        NodeType::ALL
            .iter()
            .copied()
            .find(|nt| nt.name() == s)
            .ok_or_else(|| CoreError::UnknownNodeType(s.to_string()))
    }
}

impl TryFrom<String> for NodeType {
    type Error = CoreError;

    fn try_from(value: String) -> CoreResult<Self> {
        value.parse()
    }
}

impl From<NodeType> for String {
    fn from(nt: NodeType) -> Self {
        nt.code().to_string()
    }
}

// ============================================================================
// EDGE TYPE
// ============================================================================

/// Ordered pair of node types identifying one edge relation (e.g. `tw`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EdgeType {
    pub src: NodeType,
    pub dst: NodeType,
}

impl EdgeType {
    pub const fn new(src: NodeType, dst: NodeType) -> Self {
        Self { src, dst }
    }

    /// Two-letter code, e.g. `"ww"`.
    pub fn code(&self) -> String {
        format!("{}{}", self.src.code(), self.dst.code())
    }

    /// Whether source and destination are the same type (square adjacency matrix).
    pub fn is_homogeneous(&self) -> bool {
        self.src == self.dst
    }

    /// Every ordered pair over `types`, self-pairs included.
    pub fn all_pairs(types: &[NodeType]) -> Vec<EdgeType> {
        types
            .iter()
            .flat_map(|&src| types.iter().map(move |&dst| EdgeType::new(src, dst)))
            .collect()
    }
}

impl fmt::Display for EdgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.src.code(), self.dst.code())
    }
}

impl FromStr for EdgeType {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        let mut chars = s.chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some(a), Some(b), None) => {
                match (NodeType::from_code(a), NodeType::from_code(b)) {
                    (Some(src), Some(dst)) => Ok(EdgeType::new(src, dst)),
                    _ => Err(CoreError::UnknownEdgeType(s.to_string())),
                }
            }
            _ => Err(CoreError::UnknownEdgeType(s.to_string())),
        }
    }
}

impl TryFrom<String> for EdgeType {
    type Error = CoreError;

    fn try_from(value: String) -> CoreResult<Self> {
        value.parse()
    }
}

impl From<EdgeType> for String {
    fn from(et: EdgeType) -> Self {
        et.code()
    }
}

// ============================================================================
// LOCAL KEY
// ============================================================================

/// Key of a node within its own type.
///
/// Ordering places every `Index` before every `Literal`; within a variant the
/// natural ordering applies. Relations are stored in this order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LocalKey {
    /// Dense zero-based local id (index-bearing types).
    Index(usize),
    /// Literal value (value-bearing types).
    Literal(String),
}

impl LocalKey {
    /// Key for a node given its type, type-local id and value.
    pub fn for_node(node_type: NodeType, local_id: usize, value: &str) -> Self {
        if node_type.is_value_bearing() {
            LocalKey::Literal(value.to_string())
        } else {
            LocalKey::Index(local_id)
        }
    }

    /// Parse a key read from a text file belonging to `node_type`.
    ///
    /// Index-bearing types accept integers and integral floats (`"3"`, `"3.0"`).
    /// Value-bearing types keep the text verbatim.
    pub fn parse(node_type: NodeType, text: &str) -> CoreResult<Self> {
        if node_type.is_value_bearing() {
            return Ok(LocalKey::Literal(text.to_string()));
        }
        let invalid = || CoreError::InvalidLocalKey {
            node_type: node_type.code(),
            text: text.to_string(),
        };
        if let Ok(idx) = text.parse::<usize>() {
            return Ok(LocalKey::Index(idx));
        }
        let f: f64 = text.parse().map_err(|_| invalid())?;
        if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= usize::MAX as f64 {
            Ok(LocalKey::Index(f as usize))
        } else {
            Err(invalid())
        }
    }

    pub fn as_index(&self) -> Option<usize> {
        match self {
            LocalKey::Index(i) => Some(*i),
            LocalKey::Literal(_) => None,
        }
    }

    pub fn as_literal(&self) -> Option<&str> {
        match self {
            LocalKey::Index(_) => None,
            LocalKey::Literal(s) => Some(s),
        }
    }
}

impl fmt::Display for LocalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocalKey::Index(i) => write!(f, "{}", i),
            LocalKey::Literal(s) => f.write_str(s),
        }
    }
}

impl From<usize> for LocalKey {
    fn from(i: usize) -> Self {
        LocalKey::Index(i)
    }
}

impl From<&str> for LocalKey {
    fn from(s: &str) -> Self {
        LocalKey::Literal(s.to_string())
    }
}

// ============================================================================
// JOB ID
// ============================================================================

/// Identifier of one trainer invocation.
///
/// Embedded in every interchange file name, so two jobs with the same id must
/// never run at the same time. Uniqueness is the caller's responsibility.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobId(String);

impl JobId {
    /// Create a job id; rejects empty ids and characters unsafe in file names.
    pub fn new(id: impl Into<String>) -> CoreResult<Self> {
        let id = id.into();
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
        if valid {
            Ok(Self(id))
        } else {
            Err(CoreError::InvalidJobId(id))
        }
    }

    /// Job id derived from the current process id.
    pub fn from_process() -> Self {
        Self(std::process::id().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Suffix appended to every interchange file of this job: `-<id>.txt`.
    pub fn file_suffix(&self) -> String {
        format!("-{}.txt", self.0)
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
