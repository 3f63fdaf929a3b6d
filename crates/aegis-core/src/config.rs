//! Configuration types for the Aegis Core inspection pipeline.
//!
//! Mirrors the teacher's nested-config-with-`Default`-impls shape: one
//! struct per component, composed into a single [`AegisConfig`] loaded
//! once at startup and threaded down through the pipeline.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AegisConfig {
    pub pattern: PatternConfig,
    pub ml: MlConfig,
    pub semantic: SemanticConfig,
    pub context: ContextConfig,
    pub inspector: InspectorConfig,
    pub proxy: ProxyConfig,
    pub audit: AuditConfig,
    pub global: GlobalConfig,
}

impl Default for AegisConfig {
    fn default() -> Self {
        Self {
            pattern: PatternConfig::default(),
            ml: MlConfig::default(),
            semantic: SemanticConfig::default(),
            context: ContextConfig::default(),
            inspector: InspectorConfig::default(),
            proxy: ProxyConfig::default(),
            audit: AuditConfig::default(),
            global: GlobalConfig::default(),
        }
    }
}

/// Pattern library scan limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternConfig {
    /// Stop scanning invisible characters after this many hits per document.
    pub invisible_char_scan_cap: usize,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            invisible_char_scan_cap: 50,
        }
    }
}

/// Tokenizer + ML runner configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MlConfig {
    /// Fixed sequence length for tokenizer output arrays.
    pub max_length: usize,
    /// Path to the WordPiece vocabulary file (one token per line).
    pub vocab_path: Option<String>,
    /// Confidence threshold below which a non-"normal" classification is ignored.
    pub classifier_threshold: f64,
}

impl Default for MlConfig {
    fn default() -> Self {
        Self {
            max_length: 128,
            vocab_path: None,
            classifier_threshold: 0.7,
        }
    }
}

/// Semantic analyzer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemanticConfig {
    pub similarity_threshold: f64,
    pub top_k: usize,
    pub min_confidence: f64,
    pub embedding_cache_size: usize,
    /// Use the embedding-mode analyzer instead of pattern mode.
    pub use_embeddings: bool,
}

impl Default for SemanticConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.6,
            top_k: 5,
            min_confidence: 0.5,
            embedding_cache_size: 1000,
            use_embeddings: false,
        }
    }
}

/// Context analyzer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    pub max_history_turns: usize,
    pub pruner_interval_secs: u64,
    pub session_ttl_secs: u64,
    pub escalation_threshold: f64,
    pub drift_threshold: f64,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            max_history_turns: 10,
            pruner_interval_secs: 300,
            session_ttl_secs: 1800,
            escalation_threshold: 0.6,
            drift_threshold: 0.5,
        }
    }
}

/// Deep inspector stage toggles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InspectorConfig {
    pub enable_semantic: bool,
    pub enable_context: bool,
    pub enable_ml: bool,
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            enable_semantic: true,
            enable_context: true,
            enable_ml: true,
        }
    }
}

/// LLM proxy orchestrator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    pub dry_run: bool,
    pub request_timeout_secs: u64,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            request_timeout_secs: 30,
        }
    }
}

/// Audit + alert engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    pub log_capacity: usize,
    pub threat_capacity: usize,
    pub snapshot_history_capacity: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            log_capacity: 10_000,
            threat_capacity: 10_000,
            snapshot_history_capacity: 1_000,
        }
    }
}

/// Global gateway settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Health-check timeout, shared by readiness probes.
    pub health_check_timeout_secs: u64,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            health_check_timeout_secs: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = AegisConfig::default();
        assert_eq!(config.context.max_history_turns, 10);
        assert_eq!(config.semantic.top_k, 5);
        assert!(config.inspector.enable_semantic);
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = AegisConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: AegisConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.ml.max_length, config.ml.max_length);
    }
}
