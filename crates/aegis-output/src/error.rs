use thiserror::Error;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("ml stage unavailable: {0}")]
    MlUnavailable(String),
}

pub type Result<T> = std::result::Result<T, OutputError>;
