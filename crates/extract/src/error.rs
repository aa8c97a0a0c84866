use thiserror::Error;

pub type Result<T> = std::result::Result<T, ExtractError>;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Failed to load Python grammar: {0}")]
    Language(String),

    #[error("Parser returned no tree")]
    NoTree,

    #[error("Syntax error at line {line}")]
    Syntax { line: usize },
}
