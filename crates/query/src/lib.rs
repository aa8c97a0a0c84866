//! # Codegraph Query
//!
//! Boundary toward the natural-language query layer.
//!
//! The core pipeline does not translate questions or execute queries;
//! it only guarantees a stable schema vocabulary. This crate carries
//! that boundary: a textual rendering of the graph schema, the
//! prompt template the NL layer fills in, and the [`QueryBackend`]
//! trait an external translator/executor implements.

mod prompt;

use codegraph_store::GraphSchema;
use thiserror::Error;

pub use prompt::QUERY_GENERATION_PROMPT;

pub type Result<T> = std::result::Result<T, QueryError>;

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Query generation failed: {0}")]
    Generation(String),

    #[error("Query execution failed: {0}")]
    Execution(String),
}

/// External collaborator translating questions into graph queries and
/// executing them. Implemented outside the core pipeline.
pub trait QueryBackend {
    /// Produce a query string constrained to the given schema.
    fn generate_query(&self, schema: &str, question: &str) -> Result<String>;

    /// Execute a query and return a short textual answer.
    fn run_query(&self, query: &str) -> Result<String>;
}

/// Render a [`GraphSchema`] into the text block the prompt embeds.
pub fn describe_schema(schema: &GraphSchema) -> String {
    format!(
        "Node labels: {}\nRelationship types: {}\nNode properties: {}",
        schema.labels.join(", "),
        schema.relationships.join(", "),
        schema.node_properties.join(", "),
    )
}

/// Fill the prompt template's `{schema}` and `{question}` slots.
pub fn render_prompt(schema: &str, question: &str) -> String {
    QUERY_GENERATION_PROMPT
        .replace("{schema}", schema)
        .replace("{question}", question)
}

/// One question end to end: render the schema, generate a
/// schema-constrained query, execute it.
pub fn answer_question<B: QueryBackend>(
    backend: &B,
    schema: &GraphSchema,
    question: &str,
) -> Result<String> {
    let query = backend.generate_query(&describe_schema(schema), question)?;
    backend.run_query(&query)
}
