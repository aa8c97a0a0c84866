use crate::error::Result;
use crate::store::GraphStore;
use crate::types::{EdgeKind, Label};
use codegraph_model::{Class, Function, Module, Variable};
use serde::Serialize;

/// Domain facade over a [`GraphStore`].
///
/// One method per extracted fact. Every write is at-most-one-attempt:
/// a failed upsert is logged and the fact dropped, so one bad write
/// never aborts extraction of the rest of the file. Only `clear`
/// propagates its error, since a failed full-rebuild clear would
/// leave stale facts behind.
pub struct CodeGraph<S> {
    store: S,
}

impl<S: GraphStore> CodeGraph<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Delete every node and edge. Called exactly once per
    /// full-repository run, before the first file.
    pub fn clear(&mut self) -> Result<()> {
        self.store.clear_all()
    }

    pub fn add_module(&mut self, module: &Module) {
        self.write("module", &module.name, |store| {
            store.upsert_node(Label::Module, &module.name, details_of(module).as_deref())?;
            Ok(())
        });
    }

    /// Register a module-level function: Function node plus a
    /// CONTAINS edge from its module.
    pub fn add_function(&mut self, function: &Function, module_name: &str) {
        self.write("function", &function.name, |store| {
            let func =
                store.upsert_node(Label::Function, &function.name, details_of(function).as_deref())?;
            let module = store.upsert_node(Label::Module, module_name, None)?;
            store.upsert_edge(EdgeKind::Contains, module, func)
        });
        log::info!("Added function: {} to module: {}", function.name, module_name);
    }

    pub fn add_class(&mut self, class: &Class, module_name: &str) {
        self.write("class", &class.name, |store| {
            let node = store.upsert_node(Label::Class, &class.name, details_of(class).as_deref())?;
            let module = store.upsert_node(Label::Module, module_name, None)?;
            store.upsert_edge(EdgeKind::Contains, module, node)
        });
        log::info!("Added class: {} to module: {}", class.name, module_name);
    }

    pub fn add_variable(&mut self, variable: &Variable, module_name: &str) {
        self.write("variable", &variable.name, |store| {
            let node =
                store.upsert_node(Label::Variable, &variable.name, details_of(variable).as_deref())?;
            let module = store.upsert_node(Label::Module, module_name, None)?;
            store.upsert_edge(EdgeKind::Contains, module, node)
        });
    }

    /// Attach a method to its owning class, qualified as
    /// `<ClassName>.<MethodName>`. A class name not present in the
    /// graph is a reported local skip, not a failure.
    pub fn add_method_to_class(&mut self, class_name: &str, method: &Function) {
        let Some(class) = self.store.find_node(Label::Class, class_name) else {
            log::error!("Class '{}' not found in graph", class_name);
            return;
        };

        let qualified = Class::method_identity(class_name, &method.name);
        self.write("method", &qualified, |store| {
            let node = store.upsert_node(Label::Method, &qualified, details_of(method).as_deref())?;
            store.upsert_edge(EdgeKind::Contains, class, node)
        });
        log::info!("Added method: {} to class: {}", method.name, class_name);
    }

    pub fn add_import(&mut self, import_name: &str) {
        self.write("import", import_name, |store| {
            store.upsert_node(Label::Import, import_name, None)?;
            Ok(())
        });
    }

    pub fn add_import_relationship(&mut self, importer: &str, imported: &str) {
        self.write("import edge", imported, |store| {
            let module = store.upsert_node(Label::Module, importer, None)?;
            let symbol = store.resolve_name(imported, Label::Import)?;
            store.upsert_edge(EdgeKind::Imports, module, symbol)
        });
    }

    /// Caller and callee labels are unknown at a call site; both
    /// endpoints resolve by name with a Function fallback.
    pub fn add_call(&mut self, caller: &str, callee: &str) {
        self.write("call", callee, |store| {
            let from = store.resolve_name(caller, Label::Function)?;
            let to = store.resolve_name(callee, Label::Function)?;
            store.upsert_edge(EdgeKind::Calls, from, to)
        });
        log::debug!("Added call: {} -> {}", caller, callee);
    }

    pub fn add_inheritance(&mut self, subclass: &str, superclass: &str) {
        self.write("inheritance", superclass, |store| {
            let sub = store.upsert_node(Label::Class, subclass, None)?;
            let sup = store.upsert_node(Label::Class, superclass, None)?;
            store.upsert_edge(EdgeKind::InheritsFrom, sub, sup)
        });
        log::debug!("Added inheritance: {} -> {}", subclass, superclass);
    }

    /// The used endpoint is always a Variable; the user may be a
    /// function, method or variable, so it resolves by name.
    pub fn add_variable_usage(&mut self, user: &str, used: &str) {
        self.write("usage", used, |store| {
            let from = store.resolve_name(user, Label::Function)?;
            let to = store.upsert_node(Label::Variable, used, None)?;
            store.upsert_edge(EdgeKind::Uses, from, to)
        });
        log::debug!("Added variable usage: {} -> {}", user, used);
    }

    pub fn add_creates(&mut self, creator: &str, created: &str) {
        self.write("creation", created, |store| {
            let from = store.resolve_name(creator, Label::Variable)?;
            let to = store.resolve_name(created, Label::Class)?;
            store.upsert_edge(EdgeKind::Creates, from, to)
        });
        log::debug!("Added creation: {} -> {}", creator, created);
    }

    /// Run one write, logging and dropping it on failure.
    fn write<F>(&mut self, what: &str, name: &str, op: F)
    where
        F: FnOnce(&mut S) -> Result<()>,
    {
        if let Err(e) = op(&mut self.store) {
            log::warn!("Dropped {} '{}': {}", what, name, e);
        }
    }
}

fn details_of<T: Serialize>(entity: &T) -> Option<String> {
    serde_json::to_string(entity).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryGraph;
    use pretty_assertions::assert_eq;

    fn function(name: &str) -> Function {
        Function {
            name: name.to_string(),
            parameters: vec![],
            return_type: None,
            docstring: None,
            code_snippet: format!("def {}(): pass", name),
            line_number: 1,
        }
    }

    #[test]
    fn function_is_contained_by_its_module() {
        let mut graph = CodeGraph::new(MemoryGraph::new());
        graph.add_function(&function("run"), "pkg.mod");

        let store = graph.store();
        assert!(store.find_node(Label::Function, "run").is_some());
        assert!(store.find_node(Label::Module, "pkg.mod").is_some());
        assert!(store.has_edge(EdgeKind::Contains, "pkg.mod", "run"));
    }

    #[test]
    fn method_identity_is_qualified_by_class() {
        let mut graph = CodeGraph::new(MemoryGraph::new());
        graph.add_class(
            &Class {
                name: "Dog".to_string(),
                base_classes: vec![],
                attributes: vec![],
                docstring: None,
                is_abstract: false,
            },
            "animals",
        );
        graph.add_method_to_class("Dog", &function("bark"));

        let store = graph.store();
        assert!(store.find_node(Label::Method, "Dog.bark").is_some());
        assert!(store.find_node(Label::Method, "bark").is_none());
        assert!(store.has_edge(EdgeKind::Contains, "Dog", "Dog.bark"));
    }

    #[test]
    fn method_for_unknown_class_is_skipped() {
        let mut graph = CodeGraph::new(MemoryGraph::new());
        graph.add_method_to_class("Ghost", &function("haunt"));

        assert_eq!(graph.store().node_count(), 0);
    }

    #[test]
    fn repeated_facts_do_not_duplicate() {
        let mut graph = CodeGraph::new(MemoryGraph::new());
        for _ in 0..3 {
            graph.add_call("main", "helper");
            graph.add_inheritance("Dog", "Animal");
            graph.add_import("os");
            graph.add_import_relationship("pkg.mod", "os");
        }

        let store = graph.store();
        // main, helper, Dog, Animal, os, pkg.mod
        assert_eq!(store.node_count(), 6);
        // CALLS, INHERITS_FROM, IMPORTS
        assert_eq!(store.edge_count(), 3);
    }

    #[test]
    fn call_endpoints_reuse_existing_nodes_of_other_labels() {
        let mut graph = CodeGraph::new(MemoryGraph::new());
        graph.add_function(&function("helper"), "pkg.mod");
        graph.add_call("main", "helper");

        // helper resolved to the existing Function node, main created.
        assert_eq!(graph.store().node_count(), 3);
        assert!(graph.store().has_edge(EdgeKind::Calls, "main", "helper"));
    }
}
