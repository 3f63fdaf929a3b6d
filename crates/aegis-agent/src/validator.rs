//! The four-layer agent tool-call validator (spec §4.8): whitelist,
//! parameter validation, permission scope, and risk assessment, run in
//! sequence — any layer may deny.

use crate::glob::glob_match;
use crate::patterns::scan_for_danger;
use aegis_core::RiskLevel;
use serde::{Deserialize, Serialize};
use std::time::Instant;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableRestriction {
    pub pattern: String,
    pub operations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathRestriction {
    pub pattern: String,
    pub allowed: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UrlRestriction {
    #[serde(default)]
    pub whitelist: Vec<String>,
    #[serde(default)]
    pub blacklist: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolPermission {
    pub name: String,
    pub allowed: bool,
    #[serde(default)]
    pub tables: Vec<TableRestriction>,
    #[serde(default)]
    pub paths: Vec<PathRestriction>,
    #[serde(default)]
    pub urls: Option<UrlRestriction>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentPermissionConfig {
    pub permissions: Vec<ToolPermission>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallRequest {
    pub tool_name: String,
    pub parameters: serde_json::Value,
    pub context: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialType {
    ToolNotWhitelisted,
    ParameterValidationFailed,
    PermissionDenied,
    HighRisk,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationDecision {
    pub allowed: bool,
    pub reason: Option<String>,
    pub denial_type: Option<DenialType>,
    pub risk_level: RiskLevel,
    pub latency_ms: u64,
}

impl ValidationDecision {
    fn deny(denial_type: DenialType, reason: impl Into<String>, risk_level: RiskLevel, started: Instant) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.into()),
            denial_type: Some(denial_type),
            risk_level,
            latency_ms: started.elapsed().as_millis() as u64,
        }
    }

    fn allow(started: Instant) -> Self {
        Self {
            allowed: true,
            reason: None,
            denial_type: None,
            risk_level: RiskLevel::Low,
            latency_ms: started.elapsed().as_millis() as u64,
        }
    }
}

fn param_str<'a>(params: &'a serde_json::Value, key: &str) -> Option<&'a str> {
    params.get(key).and_then(|v| v.as_str())
}

fn is_database_tool(tool_name: &str, params: &serde_json::Value) -> bool {
    tool_name == "database_query" || params.get("table").is_some()
}

fn matching_table_restriction<'a>(
    perm: &'a ToolPermission,
    table: &str,
) -> Option<&'a TableRestriction> {
    perm.tables.iter().find(|r| glob_match(&r.pattern, table))
}

/// Recursively collects every string leaf from a JSON value, including
/// strings nested in arrays and maps (spec §4.8 step 4).
fn collect_strings(value: &serde_json::Value, out: &mut Vec<String>) {
    match value {
        serde_json::Value::String(s) => out.push(s.clone()),
        serde_json::Value::Array(items) => {
            for item in items {
                collect_strings(item, out);
            }
        }
        serde_json::Value::Object(map) => {
            for v in map.values() {
                collect_strings(v, out);
            }
        }
        _ => {}
    }
}

pub struct AgentValidator {
    config: AgentPermissionConfig,
}

impl AgentValidator {
    pub fn new(config: AgentPermissionConfig) -> Self {
        Self { config }
    }

    pub fn validate(&self, request: &ToolCallRequest) -> ValidationDecision {
        let started = Instant::now();
        let tool_name = &request.tool_name;
        let params = &request.parameters;

        // Layer 1: whitelist.
        let perm = match self
            .config
            .permissions
            .iter()
            .find(|p| &p.name == tool_name)
        {
            Some(perm) if perm.allowed => perm,
            _ => {
                return ValidationDecision::deny(
                    DenialType::ToolNotWhitelisted,
                    format!("tool '{tool_name}' is not whitelisted"),
                    RiskLevel::High,
                    started,
                );
            }
        };

        // Layer 2: parameter validation.
        let mut matched_table: Option<&TableRestriction> = None;
        if is_database_tool(tool_name, params) {
            if let Some(table) = param_str(params, "table") {
                if let Some(restriction) = matching_table_restriction(perm, table) {
                    if restriction.operations.is_empty() {
                        return ValidationDecision::deny(
                            DenialType::ParameterValidationFailed,
                            format!("table '{table}' has no permitted operations"),
                            RiskLevel::High,
                            started,
                        );
                    }
                    matched_table = Some(restriction);
                }
            }
        }

        if (tool_name == "file_read" || tool_name == "file_write") || params.get("path").is_some() {
            if let Some(path) = param_str(params, "path") {
                if let Some(restriction) = perm.paths.iter().find(|r| glob_match(&r.pattern, path)) {
                    if !restriction.allowed {
                        return ValidationDecision::deny(
                            DenialType::ParameterValidationFailed,
                            format!("path '{path}' is not allowed"),
                            RiskLevel::High,
                            started,
                        );
                    }
                }
            }
        }

        if tool_name == "api_call" {
            if let Some(url) = param_str(params, "url") {
                if let Some(urls) = &perm.urls {
                    if !urls.whitelist.is_empty() && !urls.whitelist.iter().any(|p| glob_match(p, url)) {
                        return ValidationDecision::deny(
                            DenialType::ParameterValidationFailed,
                            format!("url '{url}' is not in the whitelist"),
                            RiskLevel::High,
                            started,
                        );
                    }
                    if urls.blacklist.iter().any(|p| glob_match(p, url)) {
                        return ValidationDecision::deny(
                            DenialType::ParameterValidationFailed,
                            format!("url '{url}' matches the blacklist"),
                            RiskLevel::High,
                            started,
                        );
                    }
                }
            }
        }

        // Layer 3: permission scope.
        if let (Some(table), Some(operation)) = (param_str(params, "table"), param_str(params, "operation")) {
            if let Some(restriction) = matched_table.or_else(|| matching_table_restriction(perm, table)) {
                let op = operation.to_lowercase();
                if !restriction.operations.iter().any(|allowed| allowed.to_lowercase() == op) {
                    return ValidationDecision::deny(
                        DenialType::PermissionDenied,
                        format!("operation '{operation}' not permitted on table '{table}'"),
                        RiskLevel::Medium,
                        started,
                    );
                }
            }
        }

        // Layer 4: risk assessment.
        let mut strings = Vec::new();
        collect_strings(params, &mut strings);
        let worst = strings
            .iter()
            .filter_map(|s| scan_for_danger(s))
            .max_by_key(|(_, severity)| *severity);
        if let Some((pattern_id, severity)) = worst {
            if matches!(severity, RiskLevel::Critical | RiskLevel::High) {
                return ValidationDecision::deny(
                    DenialType::HighRisk,
                    format!("parameter value matched dangerous pattern '{pattern_id}'"),
                    severity,
                    started,
                );
            }
        }

        ValidationDecision::allow(started)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config_allowing_public_select() -> AgentPermissionConfig {
        AgentPermissionConfig {
            permissions: vec![ToolPermission {
                name: "database_query".to_string(),
                allowed: true,
                tables: vec![TableRestriction {
                    pattern: "public_*".to_string(),
                    operations: vec!["select".to_string()],
                }],
                paths: Vec::new(),
                urls: None,
            }],
        }
    }

    #[test]
    fn unwhitelisted_tool_is_denied() {
        let validator = AgentValidator::new(AgentPermissionConfig::default());
        let decision = validator.validate(&ToolCallRequest {
            tool_name: "database_query".to_string(),
            parameters: json!({}),
            context: None,
        });
        assert!(!decision.allowed);
        assert_eq!(decision.denial_type, Some(DenialType::ToolNotWhitelisted));
    }

    #[test]
    fn sql_injection_in_query_param_is_denied_as_high_risk() {
        let validator = AgentValidator::new(config_allowing_public_select());
        let decision = validator.validate(&ToolCallRequest {
            tool_name: "database_query".to_string(),
            parameters: json!({
                "table": "public_data",
                "operation": "select",
                "query": "SELECT * FROM public_data; DROP TABLE users; --"
            }),
            context: None,
        });
        assert!(!decision.allowed);
        assert_eq!(decision.denial_type, Some(DenialType::HighRisk));
        assert_eq!(decision.risk_level, RiskLevel::Critical);
    }

    #[test]
    fn disallowed_operation_on_allowed_table_is_permission_denied() {
        let validator = AgentValidator::new(config_allowing_public_select());
        let decision = validator.validate(&ToolCallRequest {
            tool_name: "database_query".to_string(),
            parameters: json!({"table": "public_data", "operation": "delete", "query": "ok"}),
            context: None,
        });
        assert!(!decision.allowed);
        assert_eq!(decision.denial_type, Some(DenialType::PermissionDenied));
    }

    #[test]
    fn allowed_select_on_public_table_passes() {
        let validator = AgentValidator::new(config_allowing_public_select());
        let decision = validator.validate(&ToolCallRequest {
            tool_name: "database_query".to_string(),
            parameters: json!({"table": "public_data", "operation": "select", "query": "SELECT id FROM public_data"}),
            context: None,
        });
        assert!(decision.allowed);
    }

    #[test]
    fn path_traversal_denied_by_restriction() {
        let validator = AgentValidator::new(AgentPermissionConfig {
            permissions: vec![ToolPermission {
                name: "file_read".to_string(),
                allowed: true,
                tables: Vec::new(),
                paths: vec![PathRestriction {
                    pattern: "/etc/**".to_string(),
                    allowed: false,
                }],
                urls: None,
            }],
        });
        let decision = validator.validate(&ToolCallRequest {
            tool_name: "file_read".to_string(),
            parameters: json!({"path": "/etc/passwd"}),
            context: None,
        });
        assert!(!decision.allowed);
    }
}
