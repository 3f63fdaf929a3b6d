//! `POST /rag/*` (spec §4.7/§6).

use crate::response::ApiResponse;
use crate::state::AppState;
use aegis_core::{DocumentProvenance, DocumentSource, EmbeddingVector, TrustLevel};
use aegis_rag::{
    add_entry, check_access, create_provenance, detect_drift, mark_verified, needs_reverification,
    scan_document, verify_embedding, DriftResult, EmbeddingIntegrityResult, ScanRequest, ScanResult,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub async fn handle_rag_scan(_state: &AppState, request: ScanRequest) -> ApiResponse<ScanResult> {
    let result = scan_document(&request);
    let status = if result.is_safe { 200 } else { 403 };
    ApiResponse::new(status, Uuid::new_v4(), result)
}

#[derive(Debug, Clone, Deserialize)]
pub struct RagIngestRequest {
    pub documents: Vec<ScanRequest>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RagIngestResponse {
    pub results: Vec<ScanResult>,
    pub all_safe: bool,
}

pub async fn handle_rag_ingest(_state: &AppState, request: RagIngestRequest) -> ApiResponse<RagIngestResponse> {
    let results: Vec<ScanResult> = request.documents.iter().map(scan_document).collect();
    let all_safe = results.iter().all(|r| r.is_safe);
    let status = if all_safe { 200 } else { 403 };
    ApiResponse::new(status, Uuid::new_v4(), RagIngestResponse { results, all_safe })
}

#[derive(Debug, Clone, Deserialize)]
pub struct RagValidateChunksRequest {
    pub chunks: Vec<String>,
}

pub async fn handle_rag_validate_chunks(
    _state: &AppState,
    request: RagValidateChunksRequest,
) -> ApiResponse<RagIngestResponse> {
    let results: Vec<ScanResult> = request
        .chunks
        .iter()
        .map(|content| {
            scan_document(&ScanRequest {
                content: content.clone(),
                source: None,
                metadata: None,
            })
        })
        .collect();
    let all_safe = results.iter().all(|r| r.is_safe);
    let status = if all_safe { 200 } else { 403 };
    ApiResponse::new(status, Uuid::new_v4(), RagIngestResponse { results, all_safe })
}

#[derive(Debug, Clone, Deserialize)]
pub struct RagVerifyEmbeddingRequest {
    pub embedding: EmbeddingVector,
    pub expected_dimension: Option<usize>,
}

pub async fn handle_rag_verify_embedding(
    _state: &AppState,
    request: RagVerifyEmbeddingRequest,
) -> ApiResponse<EmbeddingIntegrityResult> {
    let result = verify_embedding(&request.embedding, request.expected_dimension);
    ApiResponse::ok(Uuid::new_v4(), result)
}

#[derive(Debug, Clone, Deserialize)]
pub struct RagDetectDriftRequest {
    pub original_content: String,
    pub current_content: String,
}

pub async fn handle_rag_detect_drift(
    _state: &AppState,
    request: RagDetectDriftRequest,
) -> ApiResponse<DriftResult> {
    let result = detect_drift(&request.original_content, &request.current_content);
    ApiResponse::ok(Uuid::new_v4(), result)
}

#[derive(Debug, Clone, Deserialize)]
pub struct RagProvenanceCreateRequest {
    pub document_id: String,
    pub source: DocumentSource,
}

pub async fn handle_rag_provenance_create(
    _state: &AppState,
    request: RagProvenanceCreateRequest,
) -> ApiResponse<DocumentProvenance> {
    let provenance = create_provenance(request.document_id, request.source);
    ApiResponse::created(Uuid::new_v4(), provenance)
}

#[derive(Debug, Clone, Deserialize)]
pub struct RagProvenanceAddEntryRequest {
    pub provenance: DocumentProvenance,
    pub action: String,
    pub actor: Option<String>,
}

pub async fn handle_rag_provenance_add_entry(
    _state: &AppState,
    request: RagProvenanceAddEntryRequest,
) -> ApiResponse<DocumentProvenance> {
    let mut provenance = request.provenance;
    add_entry(&mut provenance, request.action, request.actor);
    ApiResponse::ok(Uuid::new_v4(), provenance)
}

#[derive(Debug, Clone, Deserialize)]
pub struct RagProvenanceValidateRequest {
    pub provenance: DocumentProvenance,
    #[serde(default)]
    pub mark_verified: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RagProvenanceValidateResponse {
    pub needs_reverification: bool,
    pub provenance: DocumentProvenance,
}

pub async fn handle_rag_provenance_validate(
    _state: &AppState,
    request: RagProvenanceValidateRequest,
) -> ApiResponse<RagProvenanceValidateResponse> {
    let mut provenance = request.provenance;
    let needs = needs_reverification(&provenance);
    if request.mark_verified {
        mark_verified(&mut provenance);
    }
    ApiResponse::ok(
        Uuid::new_v4(),
        RagProvenanceValidateResponse {
            needs_reverification: needs,
            provenance,
        },
    )
}

#[derive(Debug, Clone, Deserialize)]
pub struct RagProvenanceCheckAccessRequest {
    pub provenance: DocumentProvenance,
    pub required: TrustLevel,
}

#[derive(Debug, Clone, Serialize)]
pub struct RagProvenanceCheckAccessResponse {
    pub allowed: bool,
}

pub async fn handle_rag_provenance_check_access(
    _state: &AppState,
    request: RagProvenanceCheckAccessRequest,
) -> ApiResponse<RagProvenanceCheckAccessResponse> {
    let allowed = check_access(&request.provenance, request.required);
    ApiResponse::ok(Uuid::new_v4(), RagProvenanceCheckAccessResponse { allowed })
}
