use crate::error::Result;
use crate::types::{EdgeKind, GraphSchema, Label, NodeRef};

/// Abstract property-graph store.
///
/// Both implementations (in-memory and SQLite-backed) share the same
/// upsert semantics:
///
/// - node identity is the (label, name) pair; re-upserting an
///   existing key returns the same ref and keeps the first details
///   payload (first-write-wins);
/// - edges are keyed by (kind, from, to); re-upserting never
///   duplicates;
/// - `resolve_name` mirrors a label-less merge: it matches a node of
///   any label by name and only creates one (with the caller's
///   best-effort label) when the name is entirely absent.
pub trait GraphStore {
    /// Create-if-absent node keyed by (label, name).
    fn upsert_node(&mut self, label: Label, name: &str, details: Option<&str>) -> Result<NodeRef>;

    /// Name-keyed endpoint resolution for edges whose endpoint label
    /// is unknown at the call site (call targets, use targets).
    fn resolve_name(&mut self, name: &str, fallback: Label) -> Result<NodeRef>;

    /// Lookup without creation.
    fn find_node(&self, label: Label, name: &str) -> Option<NodeRef>;

    /// Create-if-absent directed edge.
    fn upsert_edge(&mut self, kind: EdgeKind, from: NodeRef, to: NodeRef) -> Result<()>;

    /// Delete every node and edge. Outstanding [`NodeRef`]s become invalid.
    fn clear_all(&mut self) -> Result<()>;

    fn node_count(&self) -> usize;

    fn edge_count(&self) -> usize;

    /// Labels and relationship kinds currently present in the graph.
    fn schema(&self) -> GraphSchema;
}
