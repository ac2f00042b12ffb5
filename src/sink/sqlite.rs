//! SQLite implementation of the graph sink

use super::schema;
use super::{EdgeType, GraphNodeId, GraphSink, PropValue};
use crate::{Error, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// SQLite-backed labeled property graph.
pub struct SqliteSink {
    conn: Connection,
}

impl SqliteSink {
    /// Open a database file (creates if it doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let sink = Self { conn };
        sink.initialize_schema()?;
        Ok(sink)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let sink = Self { conn };
        sink.initialize_schema()?;
        Ok(sink)
    }

    fn initialize_schema(&self) -> Result<()> {
        for stmt in schema::all_schema_statements() {
            self.conn.execute(stmt, [])?;
        }
        Ok(())
    }

    // ========== Read Operations ==========

    /// All labels of a node
    pub fn labels_of(&self, node: GraphNodeId) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT label FROM node_labels WHERE node_id = ?1 ORDER BY label")?;
        let labels = stmt
            .query_map([node.0], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(labels)
    }

    /// All node ids carrying a label
    pub fn nodes_with_label(&self, label: &str) -> Result<Vec<GraphNodeId>> {
        let mut stmt = self
            .conn
            .prepare("SELECT node_id FROM node_labels WHERE label = ?1 ORDER BY node_id")?;
        let nodes = stmt
            .query_map([label], |row| row.get(0).map(GraphNodeId))?
            .collect::<rusqlite::Result<Vec<GraphNodeId>>>()?;
        Ok(nodes)
    }

    /// One property of a node, if present
    pub fn property_of(&self, node: GraphNodeId, name: &str) -> Result<Option<PropValue>> {
        self.conn
            .query_row(
                "SELECT kind, value FROM node_props WHERE node_id = ?1 AND name = ?2",
                params![node.0, name],
                |row| {
                    let kind: String = row.get(0)?;
                    Ok(match kind.as_str() {
                        "int" => PropValue::Int(row.get(1)?),
                        "bool" => PropValue::Bool(row.get::<_, i64>(1)? != 0),
                        _ => PropValue::Text(row.get(1)?),
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }

    /// Outgoing edges of a node under one relation name, in sequence order
    pub fn edges_from_named(&self, node: GraphNodeId, name: &str) -> Result<Vec<StoredEdge>> {
        let mut stmt = self.conn.prepare(
            "SELECT from_id, to_id, edge_type, name, seq FROM edges
             WHERE from_id = ?1 AND name = ?2 ORDER BY seq",
        )?;
        let edges = stmt
            .query_map(params![node.0, name], Self::row_to_edge)?
            .collect::<rusqlite::Result<Vec<StoredEdge>>>()?;
        Ok(edges)
    }

    /// All outgoing edges of a node
    pub fn edges_from(&self, node: GraphNodeId) -> Result<Vec<StoredEdge>> {
        let mut stmt = self.conn.prepare(
            "SELECT from_id, to_id, edge_type, name, seq FROM edges WHERE from_id = ?1 ORDER BY id",
        )?;
        let edges = stmt
            .query_map([node.0], Self::row_to_edge)?
            .collect::<rusqlite::Result<Vec<StoredEdge>>>()?;
        Ok(edges)
    }

    /// All incoming edges of a node
    pub fn edges_into(&self, node: GraphNodeId) -> Result<Vec<StoredEdge>> {
        let mut stmt = self.conn.prepare(
            "SELECT from_id, to_id, edge_type, name, seq FROM edges WHERE to_id = ?1 ORDER BY id",
        )?;
        let edges = stmt
            .query_map([node.0], Self::row_to_edge)?
            .collect::<rusqlite::Result<Vec<StoredEdge>>>()?;
        Ok(edges)
    }

    /// Whether a node row exists
    pub fn node_exists(&self, node: GraphNodeId) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM nodes WHERE id = ?1",
            [node.0],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Count all nodes
    pub fn count_nodes(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM nodes", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Count all edges
    pub fn count_edges(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM edges", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn count_with_label(&self, label: &str) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM node_labels WHERE label = ?1",
            [label],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Get database statistics
    pub fn stats(&self) -> Result<DbStats> {
        Ok(DbStats {
            nodes: self.count_nodes()?,
            edges: self.count_edges()?,
            bindings: self.count_with_label("Binding")?,
            projects: self.count_with_label("Project")?,
        })
    }

    fn row_to_edge(row: &rusqlite::Row) -> rusqlite::Result<StoredEdge> {
        Ok(StoredEdge {
            from: GraphNodeId(row.get(0)?),
            to: GraphNodeId(row.get(1)?),
            edge_type: row.get(2)?,
            name: row.get(3)?,
            seq: row.get(4)?,
        })
    }
}

impl GraphSink for SqliteSink {
    fn begin(&mut self) -> Result<()> {
        self.conn.execute("BEGIN TRANSACTION", [])?;
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        self.conn.execute("COMMIT", [])?;
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        self.conn.execute("ROLLBACK", [])?;
        Ok(())
    }

    fn create_node(&mut self) -> Result<GraphNodeId> {
        self.conn.execute("INSERT INTO nodes DEFAULT VALUES", [])?;
        Ok(GraphNodeId(self.conn.last_insert_rowid()))
    }

    fn add_label(&mut self, node: GraphNodeId, label: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO node_labels (node_id, label) VALUES (?1, ?2)",
            params![node.0, label],
        )?;
        Ok(())
    }

    fn set_property(&mut self, node: GraphNodeId, name: &str, value: PropValue) -> Result<()> {
        let sql = "INSERT OR REPLACE INTO node_props (node_id, name, kind, value) VALUES (?1, ?2, ?3, ?4)";
        match value {
            PropValue::Text(v) => self
                .conn
                .execute(sql, params![node.0, name, "text", v])?,
            PropValue::Int(v) => self.conn.execute(sql, params![node.0, name, "int", v])?,
            PropValue::Bool(v) => self
                .conn
                .execute(sql, params![node.0, name, "bool", v as i64])?,
        };
        Ok(())
    }

    fn create_edge(
        &mut self,
        from: GraphNodeId,
        to: GraphNodeId,
        edge_type: EdgeType,
        name: Option<&str>,
        seq: u32,
    ) -> Result<()> {
        self.conn.execute(
            "INSERT INTO edges (from_id, to_id, edge_type, name, seq) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![from.0, to.0, edge_type.as_str(), name, seq],
        )?;
        Ok(())
    }

    fn delete_node(&mut self, node: GraphNodeId) -> Result<()> {
        let incident: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM edges WHERE from_id = ?1 OR to_id = ?1",
            [node.0],
            |row| row.get(0),
        )?;
        if incident > 0 {
            return Err(Error::DeleteWithEdges(node.0));
        }
        self.conn
            .execute("DELETE FROM node_props WHERE node_id = ?1", [node.0])?;
        self.conn
            .execute("DELETE FROM node_labels WHERE node_id = ?1", [node.0])?;
        self.conn.execute("DELETE FROM nodes WHERE id = ?1", [node.0])?;
        Ok(())
    }
}

/// A persisted edge, as read back from the store
#[derive(Debug, Clone, PartialEq)]
pub struct StoredEdge {
    pub from: GraphNodeId,
    pub to: GraphNodeId,
    pub edge_type: String,
    pub name: Option<String>,
    pub seq: i64,
}

/// Database statistics
#[derive(Debug, Clone)]
pub struct DbStats {
    pub nodes: usize,
    pub edges: usize,
    pub bindings: usize,
    pub projects: usize,
}

impl std::fmt::Display for DbStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Graph Statistics:")?;
        writeln!(f, "  Nodes: {}", self.nodes)?;
        writeln!(f, "  Edges: {}", self.edges)?;
        writeln!(f, "  Binding nodes: {}", self.bindings)?;
        writeln!(f, "  Project nodes: {}", self.projects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_labels_and_props() {
        let mut sink = SqliteSink::open_in_memory().unwrap();

        let node = sink.create_node().unwrap();
        sink.add_label(node, "Class").unwrap();
        sink.add_label(node, "BodyDeclaration").unwrap();
        sink.set_property(node, "INTERFACE", PropValue::Bool(false)).unwrap();
        sink.set_property(node, "MODIFIERS", PropValue::Int(1)).unwrap();

        let labels = sink.labels_of(node).unwrap();
        assert_eq!(labels, vec!["BodyDeclaration".to_string(), "Class".to_string()]);
        assert_eq!(
            sink.property_of(node, "MODIFIERS").unwrap(),
            Some(PropValue::Int(1))
        );
        assert_eq!(
            sink.property_of(node, "INTERFACE").unwrap(),
            Some(PropValue::Bool(false))
        );
        assert_eq!(sink.property_of(node, "ABSENT").unwrap(), None);
    }

    #[test]
    fn test_named_edges_recover_sequence_order() {
        let mut sink = SqliteSink::open_in_memory().unwrap();

        let block = sink.create_node().unwrap();
        let s1 = sink.create_node().unwrap();
        let s2 = sink.create_node().unwrap();
        let s3 = sink.create_node().unwrap();

        sink.create_edge(block, s2, EdgeType::Ast, Some("statements"), 1).unwrap();
        sink.create_edge(block, s3, EdgeType::Ast, Some("statements"), 2).unwrap();
        sink.create_edge(block, s1, EdgeType::Ast, Some("statements"), 0).unwrap();

        let edges = sink.edges_from_named(block, "statements").unwrap();
        let targets: Vec<GraphNodeId> = edges.iter().map(|e| e.to).collect();
        assert_eq!(targets, vec![s1, s2, s3]);
    }

    #[test]
    fn test_delete_node_without_edges() {
        let mut sink = SqliteSink::open_in_memory().unwrap();

        let node = sink.create_node().unwrap();
        sink.add_label(node, "Modifier").unwrap();
        sink.delete_node(node).unwrap();

        assert!(!sink.node_exists(node).unwrap());
        assert!(sink.labels_of(node).unwrap().is_empty());
    }

    #[test]
    fn test_delete_with_edges_is_an_error() {
        let mut sink = SqliteSink::open_in_memory().unwrap();

        let a = sink.create_node().unwrap();
        let b = sink.create_node().unwrap();
        sink.create_edge(a, b, EdgeType::Ast, Some("body"), 0).unwrap();

        assert!(matches!(sink.delete_node(a), Err(Error::DeleteWithEdges(_))));
        assert!(matches!(sink.delete_node(b), Err(Error::DeleteWithEdges(_))));
    }

    #[test]
    fn test_rollback_discards_everything() {
        let mut sink = SqliteSink::open_in_memory().unwrap();

        sink.begin().unwrap();
        let node = sink.create_node().unwrap();
        sink.add_label(node, "Class").unwrap();
        sink.rollback().unwrap();

        assert_eq!(sink.count_nodes().unwrap(), 0);
        assert_eq!(sink.count_edges().unwrap(), 0);
    }

    #[test]
    fn test_commit_persists() {
        let mut sink = SqliteSink::open_in_memory().unwrap();

        sink.begin().unwrap();
        let node = sink.create_node().unwrap();
        sink.commit().unwrap();

        assert!(sink.node_exists(node).unwrap());
    }
}
