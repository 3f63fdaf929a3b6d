use thiserror::Error;

#[derive(Debug, Error)]
pub enum RagError {
    #[error("invalid embedding: {0}")]
    InvalidEmbedding(String),
}

pub type Result<T> = std::result::Result<T, RagError>;
