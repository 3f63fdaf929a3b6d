//! `POST /llm/chat` (spec §4.10/§6).

use crate::response::ApiResponse;
use crate::state::AppState;
use aegis_proxy::{LlmProxyRequest, LlmProxyResponse};
use uuid::Uuid;

pub async fn handle_llm_chat(state: &AppState, request: LlmProxyRequest) -> ApiResponse<LlmProxyResponse> {
    let response = state.proxy.chat(request).await;
    let status = if response.blocked { 403 } else { 200 };
    ApiResponse::new(status, Uuid::new_v4(), response)
}
