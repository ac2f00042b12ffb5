//! Graph sink - abstract graph operations and their SQLite adapter
//!
//! The engine talks to storage through the [`GraphSink`] trait: create
//! node, add label, set property, create edge, delete node, plus the
//! transaction boundary. The ordering contract lives with the callers
//! (edges only after both endpoints exist, deletes before any edge
//! could form), but the sink enforces the hard floor: deleting a node
//! with incident edges is an error, and an entire ingestion run
//! executes inside one transaction.

mod schema;
mod sqlite;

pub use sqlite::{DbStats, SqliteSink, StoredEdge};

use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a persisted graph node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GraphNodeId(pub i64);

impl fmt::Display for GraphNodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A scalar property value. Absent values are never stored; callers
/// omit the property instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropValue {
    Text(String),
    Int(i64),
    Bool(bool),
}

impl fmt::Display for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::Text(v) => write!(f, "{v}"),
            PropValue::Int(v) => write!(f, "{v}"),
            PropValue::Bool(v) => write!(f, "{v}"),
        }
    }
}

/// Coarse type of an edge; the fine-grained relation name travels as
/// the edge's `name`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeType {
    /// Structural parent -> child edge within one tree
    Ast,
    /// Containment edge from the project node to a tree root
    Contains,
    /// Reference edge from an occurrence to its shared binding node
    Binding,
}

impl EdgeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeType::Ast => "ast",
            EdgeType::Contains => "contains",
            EdgeType::Binding => "binding",
        }
    }
}

impl fmt::Display for EdgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Abstract mutating operations over the persistent property graph.
pub trait GraphSink {
    /// Begin the run-scoped transaction
    fn begin(&mut self) -> Result<()>;

    /// Commit the run-scoped transaction
    fn commit(&mut self) -> Result<()>;

    /// Roll the run back, leaving the store in its pre-run state
    fn rollback(&mut self) -> Result<()>;

    /// Create a fresh node with no labels or properties
    fn create_node(&mut self) -> Result<GraphNodeId>;

    /// Add a label to an existing node
    fn add_label(&mut self, node: GraphNodeId, label: &str) -> Result<()>;

    /// Set a scalar property on an existing node
    fn set_property(&mut self, node: GraphNodeId, name: &str, value: PropValue) -> Result<()>;

    /// Create a typed, named, directed edge. `seq` is the position of
    /// this edge within its same-named sibling group; consumers order
    /// repeated edges by it.
    fn create_edge(
        &mut self,
        from: GraphNodeId,
        to: GraphNodeId,
        edge_type: EdgeType,
        name: Option<&str>,
        seq: u32,
    ) -> Result<()>;

    /// Delete a node. Legal only while the node has zero incident
    /// edges; otherwise fails with `Error::DeleteWithEdges`.
    fn delete_node(&mut self, node: GraphNodeId) -> Result<()>;
}
