//! # Aegis Context
//!
//! The context analyzer (spec component 4): per-session turn history,
//! escalation/split-injection/drift detection, and a cancellable
//! background session pruner.

pub mod analyzer;
pub mod error;
pub mod pruner;
pub mod signals;

pub use analyzer::{ContextAnalyzer, ContextResult};
pub use error::{ContextError, Result};
pub use pruner::{spawn_pruner, PrunerHandle};
