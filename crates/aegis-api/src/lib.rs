//! # Aegis API
//!
//! The wire API surface (spec component 13): plain async handler
//! functions over [`state::AppState`], one per endpoint in spec §6.
//! Framework bootstrap (axum/actix routing, TLS, CORS) is deliberately
//! out of scope — a binary wires these handlers to whatever HTTP
//! framework it chooses.

pub mod error;
pub mod handlers;
pub mod response;
pub mod state;

pub use error::{ApiError, ErrorBody, Result};
pub use response::ApiResponse;
pub use state::AppState;
