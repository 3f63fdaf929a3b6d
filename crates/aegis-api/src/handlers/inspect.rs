//! `POST /inspect` (spec §4.5/§6).

use crate::response::ApiResponse;
use crate::state::AppState;
use aegis_core::{AuditLogEntry, InspectionResult};
use aegis_inspector::InspectRequest;
use chrono::Utc;
use uuid::Uuid;

pub async fn handle_inspect(state: &AppState, request: InspectRequest) -> ApiResponse<InspectionResult> {
    let request_id = Uuid::new_v4();
    let result = state.inspector.inspect(&request).await;

    state
        .audit
        .log_request(
            AuditLogEntry {
                id: Uuid::new_v4(),
                timestamp: Utc::now(),
                request_id,
                endpoint: "/inspect".to_string(),
                decision: if result.passed { "allow" } else { "block" }.to_string(),
                risk_score: result.risk_score,
                details: serde_json::json!({ "findingCount": result.findings.len() }),
            },
            !result.passed,
        )
        .await;

    let status = if result.passed { 200 } else { 403 };
    ApiResponse::new(status, request_id, result)
}
