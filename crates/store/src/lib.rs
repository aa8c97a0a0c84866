//! # Codegraph Store
//!
//! Graph storage for the code knowledge graph.
//!
//! ## Architecture
//!
//! ```text
//! Extractor facts
//!     │
//!     ├──> CodeGraph (domain facade)
//!     │      ├─ add_function / add_class / add_method_to_class
//!     │      ├─ add_call / add_inheritance / add_variable_usage
//!     │      └─ add_creates / add_import / add_import_relationship
//!     │
//!     └──> GraphStore (upsert contract)
//!            ├─ MemoryGraph  (petgraph, offline/tests)
//!            └─ SqliteGraph  (rusqlite, persistent)
//! ```
//!
//! Node identity is the (label, name) pair, edges are keyed by
//! (kind, from, to), and both backends guarantee that re-applying a
//! write never duplicates. Re-running extraction over unchanged input
//! therefore yields an isomorphic graph.

mod error;
mod graph;
mod memory;
mod sqlite;
mod store;
mod types;

pub use error::{Result, StoreError};
pub use graph::CodeGraph;
pub use memory::{MemoryGraph, StoredEdge, StoredNode};
pub use sqlite::SqliteGraph;
pub use store::GraphStore;
pub use types::{EdgeKind, GraphSchema, Label, NodeRef};
