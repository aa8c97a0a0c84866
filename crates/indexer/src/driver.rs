use crate::error::{IndexError, Result};
use crate::scanner::FileScanner;
use codegraph_extract::Extractor;
use codegraph_store::{CodeGraph, GraphStore};
use serde::Serialize;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Outcome of one full-repository run.
#[derive(Debug, Default, Clone, Serialize)]
pub struct RunStats {
    pub files_indexed: usize,
    pub files_failed: usize,
    pub nodes: usize,
    pub edges: usize,
}

impl std::fmt::Display for RunStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} files indexed ({} failed), {} nodes, {} edges",
            self.files_indexed, self.files_failed, self.nodes, self.edges
        )
    }
}

/// Rebuild the graph from every source file under `root`.
///
/// Full-rebuild semantics: the graph is cleared exactly once, before
/// the first file. Files are processed strictly one at a time; any
/// per-file failure (unreadable file, syntax error) is logged and the
/// run continues with the remaining files.
pub fn index_repository<S: GraphStore>(root: &Path, graph: &mut CodeGraph<S>) -> Result<RunStats> {
    graph.clear()?;

    let files = FileScanner::new(root).scan();
    let mut stats = RunStats::default();

    for path in &files {
        match index_file(root, path, graph) {
            Ok(module) => {
                stats.files_indexed += 1;
                log::info!("Indexed {} as module '{}'", path.display(), module);
            }
            Err(e) => {
                stats.files_failed += 1;
                log::warn!("Skipping {}: {}", path.display(), e);
            }
        }
    }

    stats.nodes = graph.store().node_count();
    stats.edges = graph.store().edge_count();
    log::info!("Repository run complete: {}", stats);
    Ok(stats)
}

/// Extract one file: derive its module name, parse, walk. A fresh
/// extractor per file keeps all walk context file-scoped.
fn index_file<S: GraphStore>(root: &Path, path: &Path, graph: &mut CodeGraph<S>) -> Result<String> {
    let module = module_name(root, path)?;
    let source = fs::read_to_string(path)?;
    Extractor::new(graph, module.clone()).extract(&source)?;
    Ok(module)
}

/// Canonical dotted module name for a file under `root`.
///
/// Package-index files map to their containing directory's dotted
/// path; all other files map to their relative path with separators
/// replaced by dots and the extension stripped.
pub fn module_name(root: &Path, path: &Path) -> Result<String> {
    let relative = path
        .strip_prefix(root)
        .map_err(|_| IndexError::OutsideRoot(path.display().to_string()))?;

    let trimmed: PathBuf =
        if relative.file_name().and_then(|n| n.to_str()) == Some("__init__.py") {
            relative.parent().unwrap_or_else(|| Path::new("")).to_path_buf()
        } else {
            relative.with_extension("")
        };

    let parts: Vec<String> = trimmed
        .components()
        .filter_map(|component| match component {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    Ok(parts.join("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use codegraph_store::{EdgeKind, Label, MemoryGraph};
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn package_index_maps_to_directory_path() {
        let root = Path::new("pkg");
        assert_eq!(
            module_name(root, Path::new("pkg/sub/__init__.py")).unwrap(),
            "sub"
        );
        assert_eq!(
            module_name(root, Path::new("pkg/sub/leaf.py")).unwrap(),
            "sub.leaf"
        );
        assert_eq!(module_name(root, Path::new("pkg/main.py")).unwrap(), "main");
        assert_eq!(module_name(root, Path::new("pkg/__init__.py")).unwrap(), "");
    }

    #[test]
    fn file_outside_root_is_rejected() {
        let err = module_name(Path::new("pkg"), Path::new("other/mod.py")).unwrap_err();
        assert!(matches!(err, IndexError::OutsideRoot(_)));
    }

    fn write_fixture(root: &Path) {
        let sub = root.join("animals");
        fs::create_dir_all(&sub).unwrap();
        fs::write(sub.join("__init__.py"), "import os\n").unwrap();
        fs::write(
            sub.join("dog.py"),
            "class Dog(Animal):\n    def bark(self):\n        return \"woof\"\n",
        )
        .unwrap();
    }

    #[test]
    fn repository_run_builds_the_expected_graph() {
        let temp = tempdir().unwrap();
        write_fixture(temp.path());

        let mut graph = CodeGraph::new(MemoryGraph::new());
        let stats = index_repository(temp.path(), &mut graph).unwrap();

        assert_eq!(stats.files_indexed, 2);
        assert_eq!(stats.files_failed, 0);

        let store = graph.store();
        assert!(store.find_node(Label::Module, "animals").is_some());
        assert!(store.find_node(Label::Module, "animals.dog").is_some());
        assert!(store.find_node(Label::Class, "Dog").is_some());
        assert!(store.find_node(Label::Method, "Dog.bark").is_some());
        assert!(store.has_edge(EdgeKind::Imports, "animals", "os"));
    }

    #[test]
    fn syntax_error_does_not_abort_sibling_files() {
        let temp = tempdir().unwrap();
        write_fixture(temp.path());
        fs::write(temp.path().join("broken.py"), "def broken(:\n").unwrap();

        let mut graph = CodeGraph::new(MemoryGraph::new());
        let stats = index_repository(temp.path(), &mut graph).unwrap();

        assert_eq!(stats.files_failed, 1);
        assert_eq!(stats.files_indexed, 2);
        // Entities from the valid siblings are still present.
        assert!(graph.store().find_node(Label::Class, "Dog").is_some());
    }

    #[test]
    fn rerunning_yields_an_isomorphic_graph() {
        let temp = tempdir().unwrap();
        write_fixture(temp.path());

        let mut graph = CodeGraph::new(MemoryGraph::new());
        let first = index_repository(temp.path(), &mut graph).unwrap();
        let second = index_repository(temp.path(), &mut graph).unwrap();

        assert_eq!(first.nodes, second.nodes);
        assert_eq!(first.edges, second.edges);
    }

    #[test]
    fn run_clears_stale_state_first() {
        let temp = tempdir().unwrap();
        write_fixture(temp.path());

        let mut graph = CodeGraph::new(MemoryGraph::new());
        graph
            .store_mut()
            .upsert_node(Label::Class, "Stale", None)
            .unwrap();

        index_repository(temp.path(), &mut graph).unwrap();
        assert!(graph.store().find_node(Label::Class, "Stale").is_none());
    }
}
