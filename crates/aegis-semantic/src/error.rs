use thiserror::Error;

#[derive(Debug, Error)]
pub enum SemanticError {
    #[error("semantic analyzer unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, SemanticError>;
