//! Database schema definitions for the property-graph store

/// SQL to create the nodes table
pub const CREATE_NODES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS nodes (
    id INTEGER PRIMARY KEY AUTOINCREMENT
)
"#;

/// SQL to create the node labels table
pub const CREATE_NODE_LABELS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS node_labels (
    node_id INTEGER NOT NULL,
    label TEXT NOT NULL,
    UNIQUE(node_id, label)
)
"#;

/// SQL to create the node properties table
pub const CREATE_NODE_PROPS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS node_props (
    node_id INTEGER NOT NULL,
    name TEXT NOT NULL,
    kind TEXT NOT NULL,
    value,
    UNIQUE(node_id, name)
)
"#;

/// SQL to create the edges table.
/// `seq` recovers the order of same-named sibling edges.
pub const CREATE_EDGES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS edges (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    from_id INTEGER NOT NULL,
    to_id INTEGER NOT NULL,
    edge_type TEXT NOT NULL,
    name TEXT,
    seq INTEGER NOT NULL DEFAULT 0
)
"#;

/// SQL to create indexes
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_labels_node ON node_labels(node_id)",
    "CREATE INDEX IF NOT EXISTS idx_labels_label ON node_labels(label)",
    "CREATE INDEX IF NOT EXISTS idx_props_node ON node_props(node_id)",
    "CREATE INDEX IF NOT EXISTS idx_edges_from ON edges(from_id)",
    "CREATE INDEX IF NOT EXISTS idx_edges_to ON edges(to_id)",
    "CREATE INDEX IF NOT EXISTS idx_edges_type ON edges(edge_type)",
];

/// All schema creation statements
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![
        CREATE_NODES_TABLE,
        CREATE_NODE_LABELS_TABLE,
        CREATE_NODE_PROPS_TABLE,
        CREATE_EDGES_TABLE,
    ];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}
