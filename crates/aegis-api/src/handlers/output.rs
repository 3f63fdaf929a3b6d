//! `POST /output/analyze` (spec §4.6/§6).

use crate::response::ApiResponse;
use crate::state::AppState;
use aegis_output::OutputAnalysisResult;
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
pub struct OutputAnalyzeRequest {
    pub output: String,
    #[serde(default)]
    pub context: Option<serde_json::Value>,
}

pub async fn handle_output_analyze(
    state: &AppState,
    request: OutputAnalyzeRequest,
) -> ApiResponse<OutputAnalysisResult> {
    let request_id = Uuid::new_v4();
    let result = state.output_analyzer.analyze(&request.output);
    ApiResponse::ok(request_id, result)
}
