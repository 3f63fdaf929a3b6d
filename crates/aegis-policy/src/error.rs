use thiserror::Error;

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("not implemented: {0}")]
    NotImplemented(String),

    #[error("invalid policy rule: {0}")]
    Validation(String),
}

pub type Result<T> = std::result::Result<T, PolicyError>;
