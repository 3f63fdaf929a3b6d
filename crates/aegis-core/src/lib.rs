//! # Aegis Core
//!
//! Shared data model, configuration, and error types for the Aegis LLM
//! security gateway's Core inspection pipeline.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                          AEGIS CORE                              │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  patterns → ml → semantic → context → inspector → output         │
//! │     rag → agent → mcp → proxy → policy → audit → api             │
//! │                                                                  │
//! │  Every component above depends on the types and config in this   │
//! │  crate; none of them depend on each other except where the       │
//! │  pipeline composition requires it (inspector, proxy, api).       │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! This crate carries no pipeline logic of its own — it is the common
//! vocabulary every other `aegis-*` crate is built from.

pub mod config;
pub mod error;
pub mod types;

pub use config::AegisConfig;
pub use error::{CoreError, Result};
pub use types::*;
