//! # Astgraph - Syntax trees as a labeled property graph
//!
//! Astgraph ingests semantically-resolved syntax trees and materializes
//! them as a persistent labeled property graph suitable for static
//! analysis queries (structure search, reference lookup, cross-file
//! navigation).
//!
//! Astgraph provides:
//! - A closed node-kind schema mapping every tree node to labels,
//!   properties, and typed child edges
//! - A run-scoped binding registry collapsing every occurrence of a
//!   semantic symbol onto one shared graph node
//! - An enter/recurse/exit traversal driver that guarantees edges are
//!   only created after both endpoints exist
//! - A transactional SQLite-backed graph sink

pub mod ast;
pub mod binding;
pub mod config;
pub mod discover;
pub mod ingest;
pub mod schema;
pub mod sink;
pub mod store;

// Re-exports for convenient access
pub use ast::{Binding, BindingKind, NodeId, NodeKind, RelName, SourceNode, SyntaxTree, TreeBuilder};
pub use binding::BindingRegistry;
pub use sink::{GraphNodeId, GraphSink, SqliteSink};
pub use store::TreeStorer;

/// Result type alias for astgraph operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for astgraph operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Tree error: {0}")]
    Tree(String),

    #[error("Unknown binding kind: {0}")]
    UnknownBindingKind(String),

    #[error("Unknown relation name: {0}")]
    UnknownRelName(String),

    #[error("Node {0} cannot be deleted: it has incident edges")]
    DeleteWithEdges(i64),

    #[error("Invalid project path: {0}")]
    InvalidProjectPath(String),
}
