use crate::error::Result;
use crate::store::GraphStore;
use crate::types::{EdgeKind, GraphSchema, Label, NodeRef};
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{BTreeSet, HashMap};

/// Node payload stored in the in-memory graph.
#[derive(Debug, Clone)]
pub struct StoredNode {
    pub label: Label,
    pub name: String,
    pub details: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StoredEdge {
    pub kind: EdgeKind,
}

/// In-memory directed-graph store for local/offline graph
/// construction and tests. No database dependency; same upsert
/// idempotence contract as [`crate::SqliteGraph`].
pub struct MemoryGraph {
    graph: DiGraph<StoredNode, StoredEdge>,
    /// (label, name) -> node, the upsert identity key.
    key_index: HashMap<(Label, String), NodeIndex>,
    /// name -> first node carrying it, for label-less resolution.
    name_index: HashMap<String, NodeIndex>,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            key_index: HashMap::new(),
            name_index: HashMap::new(),
        }
    }

    /// Node payload for a ref, for inspection in tests and reports.
    pub fn node(&self, node: NodeRef) -> Option<&StoredNode> {
        self.graph.node_weight(Self::index_of(node))
    }

    /// True if a `kind` edge exists between two named nodes, under
    /// any endpoint label.
    pub fn has_edge(&self, kind: EdgeKind, from: &str, to: &str) -> bool {
        let (Some(&from_idx), Some(&to_idx)) = (self.name_index.get(from), self.name_index.get(to))
        else {
            return false;
        };
        self.graph
            .edges_connecting(from_idx, to_idx)
            .any(|e| e.weight().kind == kind)
    }

    fn index_of(node: NodeRef) -> NodeIndex {
        NodeIndex::new(node.0 as usize)
    }

    fn ref_of(index: NodeIndex) -> NodeRef {
        NodeRef(index.index() as i64)
    }
}

impl Default for MemoryGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphStore for MemoryGraph {
    fn upsert_node(&mut self, label: Label, name: &str, details: Option<&str>) -> Result<NodeRef> {
        if let Some(&idx) = self.key_index.get(&(label, name.to_string())) {
            // First-write-wins: an existing node keeps its details.
            return Ok(Self::ref_of(idx));
        }

        let idx = self.graph.add_node(StoredNode {
            label,
            name: name.to_string(),
            details: details.map(|d| d.to_string()),
        });
        self.key_index.insert((label, name.to_string()), idx);
        self.name_index.entry(name.to_string()).or_insert(idx);

        log::debug!("node {}:{}", label, name);
        Ok(Self::ref_of(idx))
    }

    fn resolve_name(&mut self, name: &str, fallback: Label) -> Result<NodeRef> {
        if let Some(&idx) = self.name_index.get(name) {
            return Ok(Self::ref_of(idx));
        }
        self.upsert_node(fallback, name, None)
    }

    fn find_node(&self, label: Label, name: &str) -> Option<NodeRef> {
        self.key_index
            .get(&(label, name.to_string()))
            .map(|&idx| Self::ref_of(idx))
    }

    fn upsert_edge(&mut self, kind: EdgeKind, from: NodeRef, to: NodeRef) -> Result<()> {
        let from_idx = Self::index_of(from);
        let to_idx = Self::index_of(to);

        let exists = self
            .graph
            .edges_connecting(from_idx, to_idx)
            .any(|e| e.weight().kind == kind);
        if !exists {
            self.graph.add_edge(from_idx, to_idx, StoredEdge { kind });
        }
        Ok(())
    }

    fn clear_all(&mut self) -> Result<()> {
        self.graph.clear();
        self.key_index.clear();
        self.name_index.clear();
        log::info!("Cleared in-memory graph");
        Ok(())
    }

    fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    fn schema(&self) -> GraphSchema {
        let labels: BTreeSet<&str> = self
            .graph
            .node_weights()
            .map(|n| n.label.as_str())
            .collect();
        let relationships: BTreeSet<&str> = self
            .graph
            .edge_weights()
            .map(|e| e.kind.as_str())
            .collect();

        GraphSchema {
            labels: labels.into_iter().map(str::to_string).collect(),
            relationships: relationships.into_iter().map(str::to_string).collect(),
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
        let mut store = MemoryGraph::new();

        let first = store
            .upsert_node(Label::Function, "foo", Some("original"))
            .unwrap();
        let second = store
            .upsert_node(Label::Function, "foo", Some("overwritten"))
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(store.node_count(), 1);
        assert_eq!(store.node(first).unwrap().details.as_deref(), Some("original"));
    }

    #[test]
    fn same_name_under_different_labels_is_two_nodes() {
        let mut store = MemoryGraph::new();

        let func = store.upsert_node(Label::Function, "run", None).unwrap();
        let method = store.upsert_node(Label::Method, "run", None).unwrap();

        assert_ne!(func, method);
        assert_eq!(store.node_count(), 2);
    }

    #[test]
    fn edge_upsert_never_duplicates() {
        let mut store = MemoryGraph::new();
        let a = store.upsert_node(Label::Function, "a", None).unwrap();
        let b = store.upsert_node(Label::Function, "b", None).unwrap();

        store.upsert_edge(EdgeKind::Calls, a, b).unwrap();
        store.upsert_edge(EdgeKind::Calls, a, b).unwrap();
        // A different kind between the same endpoints is a new edge.
        store.upsert_edge(EdgeKind::Uses, a, b).unwrap();

        assert_eq!(store.edge_count(), 2);
    }

    #[test]
    fn resolve_name_matches_any_label_before_creating() {
        let mut store = MemoryGraph::new();
        let class = store.upsert_node(Label::Class, "Dog", None).unwrap();

        let resolved = store.resolve_name("Dog", Label::Function).unwrap();
        assert_eq!(resolved, class);
        assert_eq!(store.node_count(), 1);

        let created = store.resolve_name("Cat", Label::Function).unwrap();
        assert_ne!(created, class);
        assert_eq!(store.node_count(), 2);
    }

    #[test]
    fn clear_all_empties_the_graph() {
        let mut store = MemoryGraph::new();
        let a = store.upsert_node(Label::Module, "m", None).unwrap();
        let b = store.upsert_node(Label::Class, "C", None).unwrap();
        store.upsert_edge(EdgeKind::Contains, a, b).unwrap();

        store.clear_all().unwrap();

        assert_eq!(store.node_count(), 0);
        assert_eq!(store.edge_count(), 0);
        assert_eq!(store.find_node(Label::Module, "m"), None);
    }

    #[test]
    fn schema_reports_present_labels_and_kinds() {
        let mut store = MemoryGraph::new();
        let m = store.upsert_node(Label::Module, "m", None).unwrap();
        let c = store.upsert_node(Label::Class, "C", None).unwrap();
        store.upsert_edge(EdgeKind::Contains, m, c).unwrap();

        let schema = store.schema();
        assert_eq!(schema.labels, vec!["Class", "Module"]);
        assert_eq!(schema.relationships, vec!["CONTAINS"]);
        assert_eq!(schema.node_properties, vec!["name", "details"]);
    }
}
