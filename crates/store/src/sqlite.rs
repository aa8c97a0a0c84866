use crate::error::{Result, StoreError};
use crate::store::GraphStore;
use crate::types::{EdgeKind, GraphSchema, Label, NodeRef};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

const SCHEMA_SQL: &str = "\
CREATE TABLE IF NOT EXISTS nodes (
  id      INTEGER PRIMARY KEY,
  label   TEXT NOT NULL,
  name    TEXT NOT NULL,
  details TEXT,
  UNIQUE(label, name)
);
CREATE INDEX IF NOT EXISTS idx_nodes_name ON nodes(name);

CREATE TABLE IF NOT EXISTS edges (
  id      INTEGER PRIMARY KEY,
  kind    TEXT NOT NULL,
  from_id INTEGER NOT NULL REFERENCES nodes(id),
  to_id   INTEGER NOT NULL REFERENCES nodes(id),
  UNIQUE(kind, from_id, to_id)
);
";

/// Persistent property-graph store backed by SQLite.
///
/// The UNIQUE constraints carry the upsert contract: `INSERT OR
/// IGNORE` on a (label, name) or (kind, from, to) key is a no-op when
/// the row already exists, which also gives first-write-wins details.
pub struct SqliteGraph {
    conn: Connection,
}

impl SqliteGraph {
    /// Open or create a graph database at the given path.
    ///
    /// An unreachable store surfaces here as `StoreUnavailable`, not
    /// per-write.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref())
            .map_err(|e| StoreError::StoreUnavailable(e.to_string()))?;
        Self::init(conn)
    }

    /// Throwaway database for tests and dry runs.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StoreError::StoreUnavailable(e.to_string()))?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA_SQL)
            .map_err(|e| StoreError::StoreUnavailable(e.to_string()))?;
        Ok(Self { conn })
    }

    fn count(&self, sql: &str) -> usize {
        self.conn
            .query_row(sql, [], |row| row.get::<_, i64>(0))
            .unwrap_or(0) as usize
    }

    fn distinct(&self, sql: &str) -> Vec<String> {
        let Ok(mut stmt) = self.conn.prepare_cached(sql) else {
            return Vec::new();
        };
        let Ok(rows) = stmt.query_map([], |row| row.get::<_, String>(0)) else {
            return Vec::new();
        };
        rows.filter_map(|r| r.ok()).collect()
    }
}

impl GraphStore for SqliteGraph {
    fn upsert_node(&mut self, label: Label, name: &str, details: Option<&str>) -> Result<NodeRef> {
        self.conn
            .prepare_cached("INSERT OR IGNORE INTO nodes (label, name, details) VALUES (?1, ?2, ?3)")
            .and_then(|mut stmt| stmt.execute(params![label.as_str(), name, details]))
            .map_err(|e| StoreError::WriteFailed(e.to_string()))?;

        let id = self
            .conn
            .prepare_cached("SELECT id FROM nodes WHERE label = ?1 AND name = ?2")
            .and_then(|mut stmt| {
                stmt.query_row(params![label.as_str(), name], |row| row.get::<_, i64>(0))
            })
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

        Ok(NodeRef(id))
    }

    fn resolve_name(&mut self, name: &str, fallback: Label) -> Result<NodeRef> {
        let existing = self
            .conn
            .prepare_cached("SELECT id FROM nodes WHERE name = ?1 ORDER BY id LIMIT 1")
            .and_then(|mut stmt| {
                stmt.query_row(params![name], |row| row.get::<_, i64>(0))
                    .optional()
            })
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

        match existing {
            Some(id) => Ok(NodeRef(id)),
            None => self.upsert_node(fallback, name, None),
        }
    }

    fn find_node(&self, label: Label, name: &str) -> Option<NodeRef> {
        self.conn
            .prepare_cached("SELECT id FROM nodes WHERE label = ?1 AND name = ?2")
            .and_then(|mut stmt| {
                stmt.query_row(params![label.as_str(), name], |row| row.get::<_, i64>(0))
                    .optional()
            })
            .ok()
            .flatten()
            .map(NodeRef)
    }

    fn upsert_edge(&mut self, kind: EdgeKind, from: NodeRef, to: NodeRef) -> Result<()> {
        self.conn
            .prepare_cached("INSERT OR IGNORE INTO edges (kind, from_id, to_id) VALUES (?1, ?2, ?3)")
            .and_then(|mut stmt| stmt.execute(params![kind.as_str(), from.0, to.0]))
            .map_err(|e| StoreError::WriteFailed(e.to_string()))?;
        Ok(())
    }

    fn clear_all(&mut self) -> Result<()> {
        self.conn
            .execute_batch("DELETE FROM edges; DELETE FROM nodes;")
            .map_err(|e| StoreError::WriteFailed(e.to_string()))?;
        log::info!("Cleared graph database");
        Ok(())
    }

    fn node_count(&self) -> usize {
        self.count("SELECT COUNT(*) FROM nodes")
    }

    fn edge_count(&self) -> usize {
        self.count("SELECT COUNT(*) FROM edges")
    }

    fn schema(&self) -> GraphSchema {
        GraphSchema {
            labels: self.distinct("SELECT DISTINCT label FROM nodes ORDER BY label"),
            relationships: self.distinct("SELECT DISTINCT kind FROM edges ORDER BY kind"),
            node_properties: GraphSchema::node_property_names(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn node_upsert_is_idempotent_and_first_write_wins() {
        let mut store = SqliteGraph::open_in_memory().unwrap();

        let first = store
            .upsert_node(Label::Class, "Dog", Some("original"))
            .unwrap();
        let second = store
            .upsert_node(Label::Class, "Dog", Some("overwritten"))
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(store.node_count(), 1);

        let details: Option<String> = store
            .conn
            .query_row("SELECT details FROM nodes WHERE id = ?1", [first.0], |r| {
                r.get(0)
            })
            .unwrap();
        assert_eq!(details.as_deref(), Some("original"));
    }

    #[test]
    fn edge_upsert_never_duplicates() {
        let mut store = SqliteGraph::open_in_memory().unwrap();
        let a = store.upsert_node(Label::Function, "a", None).unwrap();
        let b = store.upsert_node(Label::Function, "b", None).unwrap();

        store.upsert_edge(EdgeKind::Calls, a, b).unwrap();
        store.upsert_edge(EdgeKind::Calls, a, b).unwrap();
        store.upsert_edge(EdgeKind::Uses, a, b).unwrap();

        assert_eq!(store.edge_count(), 2);
    }

    #[test]
    fn resolve_name_matches_any_label_before_creating() {
        let mut store = SqliteGraph::open_in_memory().unwrap();
        let class = store.upsert_node(Label::Class, "Dog", None).unwrap();

        assert_eq!(store.resolve_name("Dog", Label::Function).unwrap(), class);
        assert_eq!(store.node_count(), 1);

        store.resolve_name("Cat", Label::Function).unwrap();
        assert_eq!(store.node_count(), 2);
        assert!(store.find_node(Label::Function, "Cat").is_some());
    }

    #[test]
    fn clear_all_then_schema_is_empty() {
        let mut store = SqliteGraph::open_in_memory().unwrap();
        let m = store.upsert_node(Label::Module, "m", None).unwrap();
        let c = store.upsert_node(Label::Class, "C", None).unwrap();
        store.upsert_edge(EdgeKind::Contains, m, c).unwrap();

        store.clear_all().unwrap();

        assert_eq!(store.node_count(), 0);
        assert_eq!(store.edge_count(), 0);
        assert_eq!(store.schema().labels, Vec::<String>::new());
    }

    #[test]
    fn graph_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.db");

        {
            let mut store = SqliteGraph::open(&path).unwrap();
            let m = store.upsert_node(Label::Module, "pkg.mod", None).unwrap();
            let f = store.upsert_node(Label::Function, "run", None).unwrap();
            store.upsert_edge(EdgeKind::Contains, m, f).unwrap();
        }

        let store = SqliteGraph::open(&path).unwrap();
        assert_eq!(store.node_count(), 2);
        assert_eq!(store.edge_count(), 1);
        assert!(store.find_node(Label::Module, "pkg.mod").is_some());
    }
}
