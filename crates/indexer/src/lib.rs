//! # Codegraph Indexer
//!
//! Repository driver for the code knowledge graph.
//!
//! ## Pipeline
//!
//! ```text
//! Directory
//!     │
//!     ├──> File Scanner (.gitignore aware)
//!     │      └─> Python source files
//!     │
//!     ├──> Module naming (relative path -> dotted name)
//!     │
//!     └──> Extractor (one per file, shared graph)
//!            └─> Persisted nodes and edges
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use codegraph_indexer::index_repository;
//! use codegraph_store::{CodeGraph, MemoryGraph};
//! use std::path::Path;
//!
//! fn main() -> codegraph_indexer::Result<()> {
//!     let mut graph = CodeGraph::new(MemoryGraph::new());
//!     let stats = index_repository(Path::new("/path/to/project"), &mut graph)?;
//!
//!     println!("{}", stats);
//!     Ok(())
//! }
//! ```

mod driver;
mod error;
mod scanner;

pub use driver::{index_repository, module_name, RunStats};
pub use error::{IndexError, Result};
pub use scanner::FileScanner;
