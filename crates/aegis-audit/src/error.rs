use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("alert rule '{0}' not found")]
    RuleNotFound(String),
}

pub type Result<T> = std::result::Result<T, AuditError>;
