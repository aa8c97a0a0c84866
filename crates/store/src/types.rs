use serde::{Deserialize, Serialize};

/// Node labels of the code knowledge graph.
///
/// Together with [`EdgeKind`] this is the stable vocabulary the
/// downstream query layer is allowed to reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    Module,
    Class,
    Function,
    Method,
    Variable,
    Import,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Module => "Module",
            Label::Class => "Class",
            Label::Function => "Function",
            Label::Method => "Method",
            Label::Variable => "Variable",
            Label::Import => "Import",
        }
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Directed relationship kinds between nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeKind {
    /// Module contains function/class/variable; class contains method.
    Contains,

    /// Caller identifier calls callee identifier.
    Calls,

    /// Subclass inherits from superclass.
    InheritsFrom,

    /// User identifier reads a variable identifier.
    Uses,

    /// Creator identifier is bound to an instance of the created expression.
    Creates,

    /// Module imports an external or internal symbol.
    Imports,
}

impl EdgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::Contains => "CONTAINS",
            EdgeKind::Calls => "CALLS",
            EdgeKind::InheritsFrom => "INHERITS_FROM",
            EdgeKind::Uses => "USES",
            EdgeKind::Creates => "CREATES",
            EdgeKind::Imports => "IMPORTS",
        }
    }
}

impl std::fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque handle to a node inside a [`crate::GraphStore`].
///
/// Refs are only valid against the store that produced them and are
/// invalidated by `clear_all`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRef(pub i64);

/// Serializable description of the graph's current shape, consumed
/// by the query layer when generating schema-constrained queries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSchema {
    /// Node labels present in the graph, sorted.
    pub labels: Vec<String>,

    /// Relationship kinds present in the graph, sorted.
    pub relationships: Vec<String>,

    /// Property names carried by nodes.
    pub node_properties: Vec<String>,
}

impl GraphSchema {
    /// Fixed node property vocabulary shared by both store backends.
    pub fn node_property_names() -> Vec<String> {
        vec!["name".to_string(), "details".to_string()]
    }
}
