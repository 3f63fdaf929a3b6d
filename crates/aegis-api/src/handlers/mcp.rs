//! `POST /mcp/validate` (spec §4.9/§6).

use crate::response::ApiResponse;
use crate::state::AppState;
use aegis_mcp::{validate_mcp_request, McpValidateRequest, McpValidationResult};
use uuid::Uuid;

pub async fn handle_mcp_validate(
    _state: &AppState,
    request: McpValidateRequest,
) -> ApiResponse<McpValidationResult> {
    let result = validate_mcp_request(&request);
    let status = if result.is_safe { 200 } else { 403 };
    ApiResponse::new(status, Uuid::new_v4(), result)
}
