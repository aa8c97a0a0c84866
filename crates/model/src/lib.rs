//! # Codegraph Model
//!
//! Plain records describing program elements extracted from source
//! files. These are the node payloads of the code knowledge graph:
//! the extractor fills them in, the store serializes them into node
//! detail properties.

use serde::{Deserialize, Serialize};

/// A variable binding with optional declared type and literal value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,

    /// Declared or inferred type text, if any.
    #[serde(rename = "type")]
    pub type_name: Option<String>,

    /// Literal value text, if the initializer was a literal.
    pub value: Option<String>,

    /// Scope tag, e.g. "module".
    pub scope: String,
}

/// A function or method extracted from a source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Function {
    pub name: String,

    /// Ordered parameter names (implicit receivers like `self` excluded).
    pub parameters: Vec<String>,

    /// Declared return type text, if annotated.
    pub return_type: Option<String>,

    pub docstring: Option<String>,

    /// Full reconstructed source text of the definition.
    pub code_snippet: String,

    /// 1-based line of the definition.
    pub line_number: usize,
}

/// A class extracted from a source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Class {
    pub name: String,

    /// Base-class expressions as written, best-effort dotted text for
    /// attribute accesses like `module.Base`.
    pub base_classes: Vec<String>,

    /// Class-level attribute names.
    pub attributes: Vec<String>,

    pub docstring: Option<String>,

    /// Heuristic: any dunder-style method present.
    pub is_abstract: bool,
}

impl Class {
    /// Graph identity of a method owned by this class.
    pub fn method_identity(class_name: &str, method_name: &str) -> String {
        format!("{}.{}", class_name, method_name)
    }
}

/// A module: one source file, named by its dotted path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub name: String,
    pub functions: Vec<String>,
    pub classes: Vec<String>,
    pub variables: Vec<String>,
    pub imported_modules: Vec<String>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// A distributable package, tracked only as metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub name: String,
    pub version: Option<String>,
    pub license: Option<String>,
}
