use thiserror::Error;

#[derive(Debug, Error)]
pub enum InspectorError {
    #[error("inspection pipeline failed: {0}")]
    PipelineFailed(String),
}

pub type Result<T> = std::result::Result<T, InspectorError>;
