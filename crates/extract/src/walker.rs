use crate::builtins::is_builtin;
use crate::error::{ExtractError, Result};
use codegraph_model::{Class, Function, Module, Variable};
use codegraph_store::{CodeGraph, GraphStore};
use std::collections::HashMap;
use tree_sitter::{Node, Parser};

/// Single-pass extractor for one Python source file.
///
/// Walks the parsed tree depth-first and emits entity and
/// relationship records to the graph as declarations, assignments and
/// call expressions are encountered. All context is walk-scoped: one
/// fresh `Extractor` per file, bound to that file's module name.
///
/// The walk is deliberately noisy. A call expression matched by the
/// assignment rule is matched again by the generic call rule, and
/// every identifier read inside a function body becomes a USES edge.
/// Deduplication is the store's job, via upsert idempotence.
pub struct Extractor<'g, S> {
    graph: &'g mut CodeGraph<S>,
    module_name: String,

    /// Set while traversing a class body.
    current_class: Option<String>,

    /// Set while traversing a function body.
    current_function: Option<String>,

    /// Local variable name -> class name it was last assigned an
    /// instance of. Updated on simple assignment shapes only, not
    /// flow-sensitive.
    known_instances: HashMap<String, String>,
}

impl<'g, S: GraphStore> Extractor<'g, S> {
    pub fn new(graph: &'g mut CodeGraph<S>, module_name: impl Into<String>) -> Self {
        Self {
            graph,
            module_name: module_name.into(),
            current_class: None,
            current_function: None,
            known_instances: HashMap::new(),
        }
    }

    /// Parse one file's source and walk its tree.
    ///
    /// A tree containing syntax errors is rejected whole; the caller
    /// reports it and moves on to the next file.
    pub fn extract(&mut self, source: &str) -> Result<()> {
        let mut parser = Parser::new();
        let language: tree_sitter::Language = tree_sitter_python::LANGUAGE.into();
        parser
            .set_language(&language)
            .map_err(|e| ExtractError::Language(e.to_string()))?;

        let tree = parser.parse(source, None).ok_or(ExtractError::NoTree)?;
        let root = tree.root_node();
        if root.has_error() {
            return Err(ExtractError::Syntax {
                line: first_error_line(root),
            });
        }

        log::debug!("Extracting module '{}'", self.module_name);

        self.graph.add_module(&Module::new(&self.module_name));
        self.visit(root, source.as_bytes());
        Ok(())
    }

    fn visit(&mut self, node: Node, src: &[u8]) {
        match node.kind() {
            "function_definition" => self.visit_function(node, src),
            "class_definition" => self.visit_class(node, src),
            "assignment" => self.visit_assignment(node, src),
            "call" => self.visit_call(node, src),
            "import_statement" => self.visit_import(node, src),
            "import_from_statement" => self.visit_import_from(node, src),
            "identifier" => self.visit_identifier(node, src),
            // Only the object of `obj.attr` is a name read; the
            // attribute part is a field selector, not a variable.
            "attribute" => {
                if let Some(object) = node.child_by_field_name("object") {
                    self.visit(object, src);
                }
            }
            _ => self.visit_children(node, src),
        }
    }

    fn visit_children(&mut self, node: Node, src: &[u8]) {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.visit(child, src);
        }
    }

    fn visit_function(&mut self, node: Node, src: &[u8]) {
        let Some(name) = node.child_by_field_name("name").map(|n| text(n, src)) else {
            return;
        };

        let function = Function {
            name: name.clone(),
            parameters: parameter_names(node, src),
            return_type: node.child_by_field_name("return_type").map(|n| text(n, src)),
            docstring: node.child_by_field_name("body").and_then(|b| docstring(b, src)),
            code_snippet: text(node, src),
            line_number: node.start_position().row + 1,
        };

        if let Some(class_name) = self.current_class.clone() {
            self.graph.add_method_to_class(&class_name, &function);
        } else {
            self.graph.add_function(&function, &self.module_name);
        }

        self.current_function = Some(name);
        if let Some(return_type) = node.child_by_field_name("return_type") {
            self.visit(return_type, src);
        }
        if let Some(body) = node.child_by_field_name("body") {
            self.visit(body, src);
        }
        // Shallow nesting support: an inner definition clears the
        // context for the rest of the outer body too.
        self.current_function = None;
    }

    fn visit_class(&mut self, node: Node, src: &[u8]) {
        let Some(name) = node.child_by_field_name("name").map(|n| text(n, src)) else {
            return;
        };
        let body = node.child_by_field_name("body");

        let mut base_classes = Vec::new();
        if let Some(superclasses) = node.child_by_field_name("superclasses") {
            let mut cursor = superclasses.walk();
            for base in superclasses.named_children(&mut cursor) {
                if base.kind() == "keyword_argument" {
                    continue; // metaclass=..., not a base
                }
                base_classes.push(text(base, src));
            }
        }

        let class = Class {
            name: name.clone(),
            base_classes: base_classes.clone(),
            attributes: body.map(|b| class_attributes(b, src)).unwrap_or_default(),
            docstring: body.and_then(|b| docstring(b, src)),
            is_abstract: body.map(|b| has_dunder_method(b, src)).unwrap_or(false),
        };
        self.graph.add_class(&class, &self.module_name);

        // Base classes referenced through attribute access keep their
        // full dotted text; no further resolution is attempted.
        if let Some(superclasses) = node.child_by_field_name("superclasses") {
            let mut cursor = superclasses.walk();
            for base in superclasses.named_children(&mut cursor) {
                match base.kind() {
                    "identifier" | "attribute" => {
                        self.graph.add_inheritance(&name, &text(base, src));
                    }
                    _ => {}
                }
            }
        }

        self.current_class = Some(name);
        if let Some(body) = body {
            self.visit(body, src);
        }
        self.current_class = None;
    }

    fn visit_assignment(&mut self, node: Node, src: &[u8]) {
        let target = node
            .child_by_field_name("left")
            .filter(|left| left.kind() == "identifier")
            .map(|left| text(left, src));

        if let Some(target) = &target {
            if self.current_class.is_none() && self.current_function.is_none() {
                self.record_module_variable(target, node, src);
            }
            if let Some(rhs) = node.child_by_field_name("right") {
                self.handle_rhs(rhs, target, src);
            }
        }

        // The target is a store context: only the annotation and the
        // right-hand side are traversed for reads.
        if let Some(annotation) = node.child_by_field_name("type") {
            self.visit(annotation, src);
        }
        if let Some(rhs) = node.child_by_field_name("right") {
            self.visit(rhs, src);
        }
    }

    /// Assignment right-hand-side shape dispatch. Shapes outside
    /// these four emit nothing, an intentional simplification.
    fn handle_rhs(&mut self, rhs: Node, target: &str, src: &[u8]) {
        match rhs.kind() {
            "identifier" => {
                self.graph.add_variable_usage(target, &text(rhs, src));
            }
            "call" => {
                let Some(callee) = rhs.child_by_field_name("function") else {
                    return;
                };
                match callee.kind() {
                    "identifier" => {
                        let callee_name = text(callee, src);
                        self.graph.add_call(target, &callee_name);
                        self.known_instances.insert(target.to_string(), callee_name);
                    }
                    "attribute" => {
                        if let (Some(object), Some(attr)) = (
                            callee.child_by_field_name("object"),
                            callee.child_by_field_name("attribute"),
                        ) {
                            let qualified = format!("{}.{}", text(object, src), text(attr, src));
                            self.graph.add_call(target, &qualified);
                        }
                    }
                    _ => {}
                }
            }
            "attribute" => {
                // `x = module.Class` is the instantiation heuristic.
                let dotted = text(rhs, src);
                self.graph.add_creates(target, &dotted);
                self.known_instances.insert(target.to_string(), dotted);
            }
            _ => {}
        }
    }

    fn record_module_variable(&mut self, target: &str, node: Node, src: &[u8]) {
        let type_name = node.child_by_field_name("type").map(|t| text(t, src));
        let value = node
            .child_by_field_name("right")
            .filter(|rhs| {
                matches!(
                    rhs.kind(),
                    "string" | "integer" | "float" | "true" | "false" | "none"
                )
            })
            .map(|rhs| text(rhs, src));

        let variable = Variable {
            name: target.to_string(),
            type_name,
            value,
            scope: "module".to_string(),
        };
        self.graph.add_variable(&variable, &self.module_name);
    }

    fn visit_call(&mut self, node: Node, src: &[u8]) {
        if let Some(callee) = node.child_by_field_name("function") {
            match callee.kind() {
                "identifier" => {
                    let name = text(callee, src);
                    if let Some(current) = self.current_function.clone() {
                        if !is_builtin(&name) {
                            self.graph.add_call(&current, &name);
                        }
                    }
                }
                "attribute" => {
                    // Resolvable only when the receiver is a known
                    // instance; otherwise the call is skipped.
                    if let (Some(object), Some(attr)) = (
                        callee.child_by_field_name("object"),
                        callee.child_by_field_name("attribute"),
                    ) {
                        if object.kind() == "identifier" {
                            let receiver = text(object, src);
                            if let (Some(class_name), Some(current)) = (
                                self.known_instances.get(&receiver).cloned(),
                                self.current_function.clone(),
                            ) {
                                let qualified = format!("{}.{}", class_name, text(attr, src));
                                self.graph.add_call(&current, &qualified);
                            }
                        }
                    }
                }
                _ => {}
            }
        }

        self.visit_children(node, src);
    }

    fn visit_import(&mut self, node: Node, src: &[u8]) {
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            let imported = match child.kind() {
                "dotted_name" => Some(text(child, src)),
                "aliased_import" => child.child_by_field_name("name").map(|n| text(n, src)),
                _ => None,
            };
            if let Some(imported) = imported {
                self.graph.add_import(&imported);
                self.graph.add_import_relationship(&self.module_name, &imported);
            }
        }
    }

    fn visit_import_from(&mut self, node: Node, src: &[u8]) {
        let Some(source_module) = node.child_by_field_name("module_name") else {
            return;
        };
        let module_text = text(source_module, src);

        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            if child.id() == source_module.id() {
                continue;
            }
            let imported = match child.kind() {
                "dotted_name" => Some(text(child, src)),
                "aliased_import" => child.child_by_field_name("name").map(|n| text(n, src)),
                "wildcard_import" => Some("*".to_string()),
                _ => None,
            };
            if let Some(imported) = imported {
                let qualified = format!("{}.{}", module_text, imported);
                self.graph.add_import(&qualified);
                self.graph.add_import_relationship(&self.module_name, &qualified);
            }
        }
    }

    /// Every identifier read inside a function body is a USES edge, a
    /// dense over-approximation rather than a use-def analysis.
    fn visit_identifier(&mut self, node: Node, src: &[u8]) {
        if let Some(current) = self.current_function.clone() {
            self.graph.add_variable_usage(&current, &text(node, src));
        }
    }
}

fn text(node: Node, src: &[u8]) -> String {
    node.utf8_text(src).unwrap_or_default().to_string()
}

/// Ordered parameter names, implicit `self` excluded. Splat
/// parameters (`*args`, `**kwargs`) are not plain parameters and are
/// skipped.
fn parameter_names(function: Node, src: &[u8]) -> Vec<String> {
    let Some(parameters) = function.child_by_field_name("parameters") else {
        return Vec::new();
    };

    let mut names = Vec::new();
    let mut cursor = parameters.walk();
    for param in parameters.named_children(&mut cursor) {
        let name = match param.kind() {
            "identifier" => Some(text(param, src)),
            "typed_parameter" => param
                .named_child(0)
                .filter(|c| c.kind() == "identifier")
                .map(|c| text(c, src)),
            "default_parameter" | "typed_default_parameter" => param
                .child_by_field_name("name")
                .filter(|c| c.kind() == "identifier")
                .map(|c| text(c, src)),
            _ => None,
        };
        if let Some(name) = name {
            if name != "self" {
                names.push(name);
            }
        }
    }
    names
}

/// Docstring of a function or class body: a leading expression
/// statement holding a string literal, quotes stripped.
fn docstring(body: Node, src: &[u8]) -> Option<String> {
    let first = body.named_child(0)?;
    if first.kind() != "expression_statement" {
        return None;
    }
    let literal = first.named_child(0)?;
    if literal.kind() != "string" {
        return None;
    }

    let raw = text(literal, src);
    for quote in ["\"\"\"", "'''", "\"", "'"] {
        if raw.len() >= quote.len() * 2 && raw.starts_with(quote) && raw.ends_with(quote) {
            return Some(raw[quote.len()..raw.len() - quote.len()].trim().to_string());
        }
    }
    Some(raw)
}

/// Abstractness heuristic: any dunder-style method in the class body.
fn has_dunder_method(body: Node, src: &[u8]) -> bool {
    let mut cursor = body.walk();
    let result = body.named_children(&mut cursor).any(|child| {
        let definition = match child.kind() {
            "function_definition" => Some(child),
            "decorated_definition" => child
                .child_by_field_name("definition")
                .filter(|d| d.kind() == "function_definition"),
            _ => None,
        };
        definition
            .and_then(|d| d.child_by_field_name("name"))
            .map(|n| text(n, src).starts_with("__"))
            .unwrap_or(false)
    });
    result
}

/// Names assigned at class-body level.
fn class_attributes(body: Node, src: &[u8]) -> Vec<String> {
    let mut attributes = Vec::new();
    let mut cursor = body.walk();
    for child in body.named_children(&mut cursor) {
        if child.kind() != "expression_statement" {
            continue;
        }
        let Some(statement) = child.named_child(0) else {
            continue;
        };
        if statement.kind() != "assignment" {
            continue;
        }
        if let Some(left) = statement.child_by_field_name("left") {
            if left.kind() == "identifier" {
                attributes.push(text(left, src));
            }
        }
    }
    attributes
}

fn first_error_line(node: Node) -> usize {
    if node.is_error() || node.is_missing() {
        return node.start_position().row + 1;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.has_error() {
            return first_error_line(child);
        }
    }
    node.start_position().row + 1
}
