use thiserror::Error;

#[derive(Debug, Error)]
pub enum MlError {
    #[error("failed to load vocabulary file: {0}")]
    VocabLoad(String),

    #[error("inference session unavailable for model '{0}'")]
    SessionUnavailable(String),

    #[error("inference run failed: {0}")]
    InferenceFailed(String),

    #[error("output tensor '{0}' missing or malformed")]
    MalformedOutput(String),
}

pub type Result<T> = std::result::Result<T, MlError>;
