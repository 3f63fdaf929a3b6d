use thiserror::Error;

#[derive(Debug, Error)]
pub enum McpError {
    #[error("invalid request: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, McpError>;
