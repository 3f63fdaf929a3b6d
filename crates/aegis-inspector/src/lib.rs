//! # Aegis Inspector
//!
//! The deep inspection pipeline (spec component 5): composes the
//! pattern library, semantic analyzer, context analyzer, and ML
//! classifier into one `InspectionResult` with monotonic risk
//! aggregation and graceful degradation.

pub mod error;
pub mod inspector;
pub mod intent_mapping;
pub mod risk;

pub use error::{InspectorError, Result};
pub use inspector::{DeepInspector, InspectRequest};
