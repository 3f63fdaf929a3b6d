use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContextError {
    #[error("session '{0}' not found")]
    SessionNotFound(String),

    #[error("context analyzer unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, ContextError>;
