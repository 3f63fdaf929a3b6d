//! `GET /audit/logs`, `POST /reports/generate`, `GET /metrics`,
//! `GET /health`, `GET /ready` (spec §4.12/§6).

use crate::response::ApiResponse;
use crate::state::AppState;
use aegis_audit::DashboardStats;
use aegis_core::AuditLogEntry;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditLogsQuery {
    pub limit: Option<usize>,
    pub threat_type: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditLogsResponse {
    pub logs: Vec<AuditLogEntry>,
    pub total: usize,
}

pub async fn handle_audit_logs(state: &AppState, query: AuditLogsQuery) -> ApiResponse<AuditLogsResponse> {
    let mut logs = state.audit.logs().await;

    if let Some(start) = query.start_time {
        logs.retain(|entry| entry.timestamp >= start);
    }
    if let Some(end) = query.end_time {
        logs.retain(|entry| entry.timestamp <= end);
    }
    if let Some(threat_type) = &query.threat_type {
        logs.retain(|entry| entry.decision.contains(threat_type.as_str()));
    }

    let total = logs.len();
    if let Some(limit) = query.limit {
        logs.truncate(limit);
    }

    ApiResponse::ok(Uuid::new_v4(), AuditLogsResponse { logs, total })
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateReportRequest {
    pub report_type: String,
}

pub async fn handle_generate_report(
    state: &AppState,
    _request: GenerateReportRequest,
) -> ApiResponse<DashboardStats> {
    ApiResponse::ok(Uuid::new_v4(), state.audit.get_stats().await)
}

/// Renders the dashboard stats as Prometheus text exposition format.
pub async fn handle_metrics(state: &AppState) -> String {
    let stats = state.audit.get_stats().await;
    let mut out = String::new();
    out.push_str("# HELP aegis_total_requests Total requests inspected\n");
    out.push_str("# TYPE aegis_total_requests counter\n");
    out.push_str(&format!("aegis_total_requests {}\n", stats.total_requests));
    out.push_str("# HELP aegis_blocked_requests Total requests blocked\n");
    out.push_str("# TYPE aegis_blocked_requests counter\n");
    out.push_str(&format!("aegis_blocked_requests {}\n", stats.blocked_requests));
    out.push_str("# HELP aegis_block_rate Fraction of requests blocked\n");
    out.push_str("# TYPE aegis_block_rate gauge\n");
    out.push_str(&format!("aegis_block_rate {}\n", stats.block_rate));
    for (threat_type, count) in &stats.threats_by_type {
        out.push_str(&format!(
            "aegis_threats_by_type{{type=\"{threat_type}\"}} {count}\n"
        ));
    }
    out
}

pub async fn handle_health() -> &'static str {
    "ok"
}

pub async fn handle_ready(state: &AppState) -> &'static str {
    // Readiness is a trivial liveness check on the state bundle; no
    // external collaborator here can itself be "not ready" (ONNX
    // sessions, vocab files, etc. are validated at construction time).
    let _ = state.policy_store.list_rules().await;
    "ready"
}
