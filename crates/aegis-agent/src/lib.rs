//! # Aegis Agent
//!
//! The agent tool-call validator (spec component 8): four sequential
//! authorization layers — whitelist, parameter validation (glob-based),
//! permission scope, and dangerous-pattern risk assessment.

pub mod glob;
pub mod patterns;
pub mod validator;

pub use glob::glob_match;
pub use patterns::{scan_for_danger, DangerousPattern};
pub use validator::{
    AgentPermissionConfig, AgentValidator, DenialType, PathRestriction, TableRestriction,
    ToolCallRequest, ToolPermission, UrlRestriction, ValidationDecision,
};
