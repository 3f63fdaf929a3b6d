//! The wire error shape (spec §6/§7): `{code, message, details?}`, plus
//! the handler-level error enum each endpoint maps onto it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("not implemented: {0}")]
    NotImplemented(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status a framework adapter should map this to (spec §7).
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::InvalidInput(_) => 400,
            ApiError::NotFound(_) => 404,
            ApiError::NotImplemented(_) => 501,
            ApiError::Internal(_) => 500,
        }
    }

    pub fn to_body(&self) -> ErrorBody {
        let code = match self {
            ApiError::InvalidInput(_) => "INVALID_INPUT",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::NotImplemented(_) => "NOT_IMPLEMENTED",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        };
        ErrorBody {
            code: code.to_string(),
            message: self.to_string(),
            details: None,
        }
    }
}

impl From<aegis_policy::PolicyError> for ApiError {
    fn from(err: aegis_policy::PolicyError) -> Self {
        match err {
            aegis_policy::PolicyError::NotFound(msg) => ApiError::NotFound(msg),
            aegis_policy::PolicyError::NotImplemented(msg) => ApiError::NotImplemented(msg),
            aegis_policy::PolicyError::Validation(msg) => ApiError::InvalidInput(msg),
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
