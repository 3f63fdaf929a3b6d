use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("unknown LLM provider: '{0}'")]
    UnknownProvider(String),

    #[error("upstream request failed: {0}")]
    Upstream(String),
}

pub type Result<T> = std::result::Result<T, ProxyError>;
