//! Ingestion pipeline - whole-run orchestration
//!
//! One run stores a batch of resolved syntax trees and links them under
//! a single project node, all inside one transaction. Any failure rolls
//! the whole run back; the store either gains the complete project
//! graph or nothing at all.

use crate::ast::SyntaxTree;
use crate::binding::BindingRegistry;
use crate::schema::NodeLabel;
use crate::sink::{EdgeType, GraphNodeId, GraphSink, PropValue};
use crate::store::TreeStorer;
use crate::Result;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{info, warn};

/// Summary of a completed ingestion run.
#[derive(Debug, Clone)]
pub struct IngestReport {
    /// Project name as stored on the project node
    pub project: String,
    /// Graph node of the project root
    pub project_node: GraphNodeId,
    /// Number of trees stored
    pub trees: usize,
    /// Number of distinct binding keys resolved across the run
    pub bindings: usize,
}

impl std::fmt::Display for IngestReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "project '{}' ({}): {} trees, {} bindings",
            self.project, self.project_node, self.trees, self.bindings
        )
    }
}

/// Ingest a batch of trees as one project, transactionally.
///
/// Trees are stored in the order given; a shared binding registry
/// spans all of them, so a symbol referenced from several files ends
/// up as one graph node. On any error the transaction is rolled back
/// and the store is left exactly as it was before the run.
pub fn ingest(
    sink: &mut dyn GraphSink,
    project: &str,
    trees: &[SyntaxTree],
) -> Result<IngestReport> {
    sink.begin()?;
    match store_all(sink, project, trees) {
        Ok(report) => {
            sink.commit()?;
            info!(%report, "ingestion committed");
            Ok(report)
        }
        Err(err) => {
            if let Err(rb) = sink.rollback() {
                warn!(error = %rb, "rollback after failed ingestion also failed");
            }
            Err(err)
        }
    }
}

fn store_all(
    sink: &mut dyn GraphSink,
    project: &str,
    trees: &[SyntaxTree],
) -> Result<IngestReport> {
    let mut registry = BindingRegistry::new();
    let mut roots = Vec::with_capacity(trees.len());

    for tree in trees {
        tree.validate()?;
        let root = TreeStorer::new(sink, &mut registry).store(tree)?;
        roots.push(root);
    }

    let project_node = link_project(sink, project, &roots)?;
    Ok(IngestReport {
        project: project.to_string(),
        project_node,
        trees: trees.len(),
        bindings: registry.len(),
    })
}

/// Create the project node and one containment edge per tree root.
///
/// Roots are linked in ingestion order; the sequence number recovers
/// it on the way out.
fn link_project(
    sink: &mut dyn GraphSink,
    project: &str,
    roots: &[GraphNodeId],
) -> Result<GraphNodeId> {
    let node = sink.create_node()?;
    sink.add_label(node, NodeLabel::Project.as_str())?;
    sink.set_property(node, "NAME", PropValue::Text(project.to_string()))?;
    for (seq, root) in roots.iter().enumerate() {
        sink.create_edge(node, *root, EdgeType::Contains, None, seq as u32)?;
    }
    Ok(node)
}

/// Load one serialized tree from a JSON file.
pub fn load_tree(path: &Path) -> Result<SyntaxTree> {
    let file = File::open(path)?;
    let tree: SyntaxTree = serde_json::from_reader(BufReader::new(file))?;
    tree.validate()?;
    Ok(tree)
}

/// Load every `.json` tree under a directory, in path order.
///
/// Path order keeps runs deterministic regardless of how the
/// filesystem enumerates entries.
pub fn load_tree_dir(dir: &Path) -> Result<Vec<SyntaxTree>> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut trees = Vec::with_capacity(paths.len());
    for path in &paths {
        trees.push(load_tree(path)?);
    }
    info!(dir = %dir.display(), trees = trees.len(), "loaded serialized trees");
    Ok(trees)
}

/// Derive a project name from its root path (the last path component).
pub fn project_name_from(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "project".to_string())
}
