//! `/policies*` CRUD, versioning, and rollback (spec §4.11/§6).
//! `reload` is wire-contracted but not implemented here — loading policy
//! YAML off disk is an external file contract, not pipeline logic.

use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::state::AppState;
use aegis_core::{PolicyRule, PolicyVersion};
use serde::Deserialize;
use uuid::Uuid;

pub async fn handle_list_policies(state: &AppState) -> ApiResponse<Vec<PolicyRule>> {
    ApiResponse::ok(Uuid::new_v4(), state.policy_store.list_rules().await)
}

pub async fn handle_create_policy(state: &AppState, rule: PolicyRule) -> ApiResponse<PolicyRule> {
    state.policy_store.add_rule(rule.clone()).await;
    ApiResponse::created(Uuid::new_v4(), rule)
}

pub async fn handle_get_policy(state: &AppState, id: &str) -> Result<ApiResponse<PolicyRule>, ApiError> {
    let rule = state
        .policy_store
        .get_rule(id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("policy rule '{id}' not found")))?;
    Ok(ApiResponse::ok(Uuid::new_v4(), rule))
}

pub async fn handle_update_policy(
    state: &AppState,
    rule: PolicyRule,
) -> Result<ApiResponse<PolicyRule>, ApiError> {
    state.policy_store.update_rule(rule.clone()).await?;
    Ok(ApiResponse::ok(Uuid::new_v4(), rule))
}

pub async fn handle_delete_policy(state: &AppState, id: &str) -> Result<ApiResponse<()>, ApiError> {
    state.policy_store.remove_rule(id).await?;
    Ok(ApiResponse::new(204, Uuid::new_v4(), ()))
}

pub async fn handle_list_policy_versions(state: &AppState) -> ApiResponse<Vec<PolicyVersion>> {
    ApiResponse::ok(Uuid::new_v4(), state.policy_store.list_versions().await)
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreatePolicyVersionRequest {
    pub description: Option<String>,
    pub created_by: Option<String>,
}

pub async fn handle_create_policy_version(
    state: &AppState,
    request: CreatePolicyVersionRequest,
) -> ApiResponse<PolicyVersion> {
    let version = state
        .policy_store
        .create_version(request.description, request.created_by)
        .await;
    ApiResponse::created(Uuid::new_v4(), version)
}

pub async fn handle_get_policy_version(
    state: &AppState,
    version_id: Uuid,
) -> Result<ApiResponse<PolicyVersion>, ApiError> {
    let version = state
        .policy_store
        .get_version(version_id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("policy version '{version_id}' not found")))?;
    Ok(ApiResponse::ok(Uuid::new_v4(), version))
}

pub async fn handle_rollback_policy(
    state: &AppState,
    version_id: Uuid,
) -> Result<ApiResponse<PolicyVersion>, ApiError> {
    let restored = state.policy_store.rollback(version_id).await?;
    Ok(ApiResponse::ok(Uuid::new_v4(), restored))
}

/// `POST /policies/reload`: always 501, since the YAML policy loader is
/// out of scope (spec §1 Non-goals).
pub async fn handle_reload_policies(_state: &AppState) -> Result<ApiResponse<()>, ApiError> {
    Err(ApiError::NotImplemented(
        "policy reload from file requires the YAML loader, which is out of scope".to_string(),
    ))
}
