//! Shared application state (spec §4.13): `Arc` handles to every
//! component the handlers wire together. Construction (loading vocab,
//! ONNX sessions, policy YAML) is left to the binary that builds one of
//! these — this crate only defines the shape and the handlers that use
//! it.

use aegis_agent::AgentValidator;
use aegis_audit::{AlertEngine, AuditEngine};
use aegis_inspector::DeepInspector;
use aegis_output::OutputAnalyzer;
use aegis_policy::PolicyStore;
use aegis_proxy::LlmProxyOrchestrator;
use std::sync::Arc;

pub struct AppState {
    pub inspector: Arc<DeepInspector>,
    pub output_analyzer: Arc<OutputAnalyzer>,
    pub agent_validator: Arc<AgentValidator>,
    pub policy_store: Arc<PolicyStore>,
    pub audit: Arc<AuditEngine>,
    pub alerts: Arc<AlertEngine>,
    pub proxy: Arc<LlmProxyOrchestrator>,
}

impl AppState {
    pub fn new(
        inspector: Arc<DeepInspector>,
        output_analyzer: Arc<OutputAnalyzer>,
        agent_validator: Arc<AgentValidator>,
        policy_store: Arc<PolicyStore>,
        audit: Arc<AuditEngine>,
        alerts: Arc<AlertEngine>,
        proxy: Arc<LlmProxyOrchestrator>,
    ) -> Self {
        Self {
            inspector,
            output_analyzer,
            agent_validator,
            policy_store,
            audit,
            alerts,
            proxy,
        }
    }
}
