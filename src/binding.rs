//! Binding registry - global symbol deduplication
//!
//! Every occurrence of the same semantic binding (type, method or
//! variable) across the whole ingestion run collapses onto one shared
//! graph node. The registry owns the key -> node cache; it is
//! run-scoped state threaded explicitly through the traversal, and a
//! fresh run starts empty.

use crate::ast::Binding;
use crate::schema::{self, NodeLabel};
use crate::sink::{EdgeType, GraphNodeId, GraphSink, PropValue};
use crate::Result;
use std::collections::HashMap;
use tracing::debug;

/// Run-scoped key -> shared-node map for semantic bindings.
#[derive(Debug, Default)]
pub struct BindingRegistry {
    nodes: HashMap<String, GraphNodeId>,
}

impl BindingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve an occurrence of a binding.
    ///
    /// On first sight of the key, creates the shared binding node
    /// (label `Binding` plus the kind-specific subtype, properties
    /// `KEY` and `NAME`) and caches it. On every sight, including the
    /// first, adds one reference edge from the occurrence node to the
    /// shared node.
    ///
    /// Trivial built-in types never reach this method; callers filter
    /// them with [`Binding::is_trivial`].
    pub fn resolve(
        &mut self,
        sink: &mut dyn GraphSink,
        occurrence: GraphNodeId,
        binding: &Binding,
    ) -> Result<GraphNodeId> {
        let shared = match self.nodes.get(&binding.key) {
            Some(node) => *node,
            None => {
                let node = sink.create_node()?;
                sink.add_label(node, NodeLabel::Binding.as_str())?;
                sink.add_label(node, schema::binding_label(binding.kind).as_str())?;
                sink.set_property(node, "KEY", PropValue::Text(binding.key.clone()))?;
                sink.set_property(node, "NAME", PropValue::Text(binding.name.clone()))?;
                debug!(key = %binding.key, kind = %binding.kind, "created binding node");
                self.nodes.insert(binding.key.clone(), node);
                node
            }
        };

        sink.create_edge(occurrence, shared, EdgeType::Binding, None, 0)?;
        Ok(shared)
    }

    /// Number of distinct binding keys seen so far
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::BindingKind;
    use crate::sink::SqliteSink;

    fn type_binding(name: &str) -> Binding {
        Binding::new(BindingKind::Type, format!("Lcom/example/{name};"), name)
    }

    #[test]
    fn test_first_sight_creates_shared_node() {
        let mut sink = SqliteSink::open_in_memory().unwrap();
        let mut registry = BindingRegistry::new();

        let occurrence = sink.create_node().unwrap();
        let shared = registry
            .resolve(&mut sink, occurrence, &type_binding("A"))
            .unwrap();

        assert_eq!(registry.len(), 1);
        let labels = sink.labels_of(shared).unwrap();
        assert!(labels.contains(&"Binding".to_string()));
        assert!(labels.contains(&"TypeBinding".to_string()));
        assert_eq!(
            sink.property_of(shared, "NAME").unwrap(),
            Some(PropValue::Text("A".into()))
        );
    }

    #[test]
    fn test_dedup_idempotence() {
        let mut sink = SqliteSink::open_in_memory().unwrap();
        let mut registry = BindingRegistry::new();
        let binding = type_binding("A");

        let occ1 = sink.create_node().unwrap();
        let occ2 = sink.create_node().unwrap();
        let occ3 = sink.create_node().unwrap();

        let n1 = registry.resolve(&mut sink, occ1, &binding).unwrap();
        let n2 = registry.resolve(&mut sink, occ2, &binding).unwrap();
        let n3 = registry.resolve(&mut sink, occ3, &binding).unwrap();

        assert_eq!(n1, n2);
        assert_eq!(n2, n3);
        assert_eq!(registry.len(), 1);
        // one reference edge per occurrence into the single shared node
        assert_eq!(sink.edges_into(n1).unwrap().len(), 3);
    }

    #[test]
    fn test_distinct_keys_get_distinct_nodes() {
        let mut sink = SqliteSink::open_in_memory().unwrap();
        let mut registry = BindingRegistry::new();

        let occ = sink.create_node().unwrap();
        let a = registry.resolve(&mut sink, occ, &type_binding("A")).unwrap();
        let b = registry.resolve(&mut sink, occ, &type_binding("B")).unwrap();

        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_kind_subtype_labels() {
        let mut sink = SqliteSink::open_in_memory().unwrap();
        let mut registry = BindingRegistry::new();
        let occ = sink.create_node().unwrap();

        let method = Binding::new(BindingKind::Method, "Lcom/example/A;.m()V", "m");
        let variable = Binding::new(BindingKind::Variable, "Lcom/example/A;.x", "x");

        let m = registry.resolve(&mut sink, occ, &method).unwrap();
        let v = registry.resolve(&mut sink, occ, &variable).unwrap();

        assert!(sink.labels_of(m).unwrap().contains(&"MethodBinding".to_string()));
        assert!(sink.labels_of(v).unwrap().contains(&"VariableBinding".to_string()));
    }
}
