use thiserror::Error;

pub type Result<T> = std::result::Result<T, IndexError>;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Store(#[from] codegraph_store::StoreError),

    #[error(transparent)]
    Extract(#[from] codegraph_extract::ExtractError),

    #[error("Path {0} is not under the repository root")]
    OutsideRoot(String),
}
