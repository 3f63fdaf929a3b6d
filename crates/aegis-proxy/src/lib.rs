//! # Aegis Proxy
//!
//! The LLM proxy orchestrator (spec component 10): runs the input
//! guard, resolves a provider, short-circuits to a synthetic reply in
//! dry-run mode, otherwise builds and executes the provider-specific
//! request (JSON or SSE), then runs the output guard over the reply.

pub mod error;
pub mod orchestrator;
pub mod providers;
pub mod sse;

pub use error::{ProxyError, Result};
pub use orchestrator::{
    ChatMessage, InputGuardResult, LlmProxyOrchestrator, LlmProxyRequest, LlmProxyResponse,
    LlmResponse, OutputGuardResult,
};
pub use providers::{ProviderCatalog, ProviderConfig, ProviderFamily};
