//! # Aegis MCP
//!
//! The MCP tool-description validator (spec component 9): poisoning-
//! pattern scanning, base64-decode-then-match, `inputSchema` keyword
//! scanning for excessive scope, and a credential scan over request
//! params.

pub mod catalog;
pub mod error;
pub mod validator;

pub use catalog::{scan_poisoning, schema_has_excessive_scope, EXCESSIVE_SCOPE_KEYWORDS};
pub use error::{McpError, Result};
pub use validator::{validate_mcp_request, McpFinding, McpTool, McpValidateRequest, McpValidationResult};
