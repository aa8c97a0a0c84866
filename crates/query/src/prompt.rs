/// Query-generation prompt consumed by the external NL layer.
///
/// The `{schema}` and `{question}` slots are filled by
/// [`crate::render_prompt`]. The instructions constrain the generated
/// query to schema-declared relationship types and properties only.
pub const QUERY_GENERATION_PROMPT: &str = "\
Task: Generate a graph query statement to query a graph database.
Instructions:
Use only the provided relationship types and properties in the
schema. Do not use any other relationship types or properties that
are not provided.
Schema:
{schema}
Note: Do not include any explanations or apologies in your responses.
Do not respond to any questions that might ask anything else than
for you to construct a query statement.
Do not include any text except the generated query statement.
Examples: Here are a few examples of generated query
statements for particular questions:

# Explain all methods in the class inside the sort_algorithms.quick_sort module?
MATCH (:Module {name: \"sort_algorithms.quick_sort\"})-[:CONTAINS]->(:Class)-[:CONTAINS]->(m:Method)
RETURN m

# Which classes inherit from Animal?
MATCH (c:Class)-[:INHERITS_FROM]->(:Class {name: \"Animal\"})
RETURN c.name

The question is:
{question}";
