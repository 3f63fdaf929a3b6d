//! Shared error taxonomy.
//!
//! Component crates define their own `thiserror` enums for their internal
//! failure modes; this type is the common currency for the handful of
//! cross-cutting error kinds every component and the API surface agree on.

use thiserror::Error;

/// Error kinds shared across the gateway.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Malformed request body, missing required field, oversize input.
    #[error("invalid input: {0}")]
    Validation(String),

    /// Rule, version, or session not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Operation not implemented by this store/backend.
    #[error("not implemented: {0}")]
    NotImplemented(String),

    /// Internal invariant violation.
    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
