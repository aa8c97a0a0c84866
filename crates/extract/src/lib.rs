//! # Codegraph Extract
//!
//! Syntax walker for the code knowledge graph.
//!
//! One [`Extractor`] per source file performs a single depth-first
//! pass over the tree-sitter parse tree and emits entity and
//! relationship records to a [`codegraph_store::CodeGraph`]:
//!
//! - declarations become Function / Method / Class nodes with
//!   CONTAINS edges from their module or class;
//! - assignments are shape-matched into USES / CALLS / CREATES edges;
//! - call expressions become CALLS edges, filtered against the Python
//!   builtin table and resolved through known instance bindings;
//! - imports become Import nodes with IMPORTS edges.
//!
//! Name resolution is best-effort by design: the walker tracks only
//! simple local instance bindings and never attempts whole-program
//! analysis.

mod builtins;
mod error;
mod walker;

pub use builtins::is_builtin;
pub use error::{ExtractError, Result};
pub use walker::Extractor;
