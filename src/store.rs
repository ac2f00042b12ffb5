//! Traversal driver - stores one syntax tree into the graph
//!
//! Each node goes through three phases, recursively:
//!
//! 1. **Enter** (pre-order): create its graph node, assign labels,
//!    resolve its semantic binding, record the SourceNode -> GraphNode
//!    mapping.
//! 2. **Recurse**: visit all children in order.
//! 3. **Exit** (post-order): set scalar properties, emit child edges,
//!    and delete the node if its kind is materialize-then-delete.
//!
//! Edges are only emitted at Exit, after every child's Enter has run,
//! so both endpoints of an edge always exist by the time it is
//! created. Discard nodes are deleted at their own Exit, which runs
//! strictly before the parent's edge emission, so no edge can ever
//! touch them.

use crate::ast::{NodeId, SyntaxTree};
use crate::binding::BindingRegistry;
use crate::schema;
use crate::sink::{EdgeType, GraphNodeId, GraphSink, PropValue};
use crate::{Error, Result};
use std::collections::HashMap;
use tracing::info;

/// Stores one tree. The per-tree SourceNode -> GraphNode identity map
/// lives here; the binding registry is run-scoped and borrowed.
pub struct TreeStorer<'a> {
    sink: &'a mut dyn GraphSink,
    registry: &'a mut BindingRegistry,
    node_map: HashMap<NodeId, GraphNodeId>,
}

impl<'a> TreeStorer<'a> {
    pub fn new(sink: &'a mut dyn GraphSink, registry: &'a mut BindingRegistry) -> Self {
        Self {
            sink,
            registry,
            node_map: HashMap::new(),
        }
    }

    /// Traverse and store the whole tree, returning the graph node of
    /// its root, tagged with the originating file name.
    pub fn store(mut self, tree: &SyntaxTree) -> Result<GraphNodeId> {
        self.visit(tree, tree.root())?;

        let root = self.node_map[&tree.root()];
        self.sink
            .set_property(root, "FILENAME", PropValue::Text(tree.filename.clone()))?;
        info!(filename = %tree.filename, nodes = self.node_map.len(), "stored tree");
        Ok(root)
    }

    fn visit(&mut self, tree: &SyntaxTree, id: NodeId) -> Result<()> {
        self.enter(tree, id)?;
        for link in &tree.node(id).children {
            self.visit(tree, link.target)?;
        }
        self.exit(tree, id)
    }

    fn enter(&mut self, tree: &SyntaxTree, id: NodeId) -> Result<()> {
        if self.node_map.contains_key(&id) {
            return Err(Error::Tree(format!(
                "node {} of '{}' is linked more than once",
                id, tree.filename
            )));
        }

        let source = tree.node(id);
        let graph_node = self.sink.create_node()?;

        let classification = schema::classify(source.kind);
        self.sink.add_label(graph_node, classification.primary)?;
        for capability in classification.capabilities {
            self.sink.add_label(graph_node, capability.as_str())?;
        }

        if !schema::is_discard(source.kind) {
            if let Some(binding) = &source.binding {
                if !binding.is_trivial() {
                    self.registry.resolve(self.sink, graph_node, binding)?;
                }
            }
        }

        self.node_map.insert(id, graph_node);
        Ok(())
    }

    fn exit(&mut self, tree: &SyntaxTree, id: NodeId) -> Result<()> {
        let source = tree.node(id);
        let graph_node = self.node_map[&id];

        for (name, value) in schema::properties(source) {
            self.sink.set_property(graph_node, name, value)?;
        }

        // every child already went through Enter, so all endpoints
        // exist; discard children were deleted at their own Exit and
        // are filtered out of the edge spec
        let mut seq_within: HashMap<&'static str, u32> = HashMap::new();
        for (rel, child) in schema::child_edges(tree, id)? {
            let target = self.node_map[&child];
            let seq = seq_within.entry(rel.as_str()).or_insert(0);
            self.sink
                .create_edge(graph_node, target, EdgeType::Ast, Some(rel.as_str()), *seq)?;
            *seq += 1;
        }

        if schema::is_discard(source.kind) {
            self.sink.delete_node(graph_node)?;
        }
        Ok(())
    }
}
