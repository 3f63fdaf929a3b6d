//! `POST /agent/validate-tool` (spec §4.8/§6).

use crate::response::ApiResponse;
use crate::state::AppState;
use aegis_agent::{ToolCallRequest, ValidationDecision};
use uuid::Uuid;

pub async fn handle_agent_validate_tool(
    state: &AppState,
    request: ToolCallRequest,
) -> ApiResponse<ValidationDecision> {
    let decision = state.agent_validator.validate(&request);
    let status = if decision.allowed { 200 } else { 403 };
    ApiResponse::new(status, Uuid::new_v4(), decision)
}
