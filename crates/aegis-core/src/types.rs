//! The shared data model (spec §3): patterns, policy rules and versions,
//! detection/inspection results, session state, embeddings, provenance,
//! audit records, and alert rules. Every component crate builds on these
//! rather than rolling its own copies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Severity / risk level, shared by policy rules, findings, and alerts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

pub type RiskLevel = Severity;

/// Broad threat categories referenced by policy rules, findings, and
/// threat events. `Custom` carries anything not in the closed catalog so
/// the enum stays useful as a policy-rule `category` without becoming a
/// DSL of its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreatType {
    DirectInjection,
    IndirectInjection,
    Jailbreak,
    DataExfiltration,
    RoleManipulation,
    ContextConfusion,
    GradualEscalation,
    InvisibleCharacters,
    HiddenDirective,
    EncodingAttack,
    Homoglyph,
    CredentialExposure,
    InstructionInjection,
    ExcessiveScope,
    PiiExposure,
    SensitiveData,
    PolicyViolation,
    Custom(String),
}

impl ThreatType {
    /// A stable string identifier, used in findings and audit records
    /// independent of the serde tag (which is structurally the same but
    /// this keeps call sites from depending on serde internals).
    pub fn as_str(&self) -> &str {
        match self {
            Self::DirectInjection => "direct_injection",
            Self::IndirectInjection => "indirect_injection",
            Self::Jailbreak => "jailbreak",
            Self::DataExfiltration => "data_exfiltration",
            Self::RoleManipulation => "role_manipulation",
            Self::ContextConfusion => "context_confusion",
            Self::GradualEscalation => "gradual_escalation",
            Self::InvisibleCharacters => "invisible_characters",
            Self::HiddenDirective => "hidden_directive",
            Self::EncodingAttack => "encoding_attack",
            Self::Homoglyph => "homoglyph",
            Self::CredentialExposure => "credential_exposure",
            Self::InstructionInjection => "instruction_injection",
            Self::ExcessiveScope => "excessive_scope",
            Self::PiiExposure => "pii_exposure",
            Self::SensitiveData => "sensitive_data",
            Self::PolicyViolation => "policy_violation",
            Self::Custom(s) => s.as_str(),
        }
    }
}

/// Policy action taken when a rule matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Allow,
    Warn,
    Block,
}

/// One of the four pattern kinds a policy rule may be built from.
/// Composite patterns recurse; implementations must bound recursion
/// (checked at evaluation time, see `aegis-policy`) at depth 8.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Pattern {
    Regex {
        pattern: String,
        flags: Option<String>,
    },
    Semantic {
        intent: String,
        threshold: f64,
        references: Option<Vec<String>>,
    },
    Ml {
        model: MlModelName,
        threshold: f64,
        labels: Option<Vec<String>>,
    },
    Composite {
        operator: CompositeOperator,
        patterns: Vec<Pattern>,
    },
}

/// Maximum composite pattern nesting depth (spec §3 invariant).
pub const MAX_COMPOSITE_DEPTH: usize = 8;

impl Pattern {
    /// Depth of composite nesting rooted at this pattern (leaves are 1).
    pub fn depth(&self) -> usize {
        match self {
            Pattern::Composite { patterns, .. } => {
                1 + patterns.iter().map(Pattern::depth).max().unwrap_or(0)
            }
            _ => 1,
        }
    }

    pub fn within_depth_bound(&self) -> bool {
        self.depth() <= MAX_COMPOSITE_DEPTH
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MlModelName {
    InjectionClassifier,
    PiiDetector,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositeOperator {
    And,
    Or,
    Not,
}

/// A span matched within a document by the pattern library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSpan {
    pub start: usize,
    pub end: usize,
    pub matched: String,
}

/// A stored policy rule. Sorted by `priority` descending in the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyRule {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: ThreatType,
    pub severity: Severity,
    pub action: Action,
    pub is_active: bool,
    pub priority: i32,
    pub patterns: Vec<Pattern>,
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An immutable snapshot of the rule set, captured before every rollback
/// and on demand via `createVersion`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyVersion {
    pub version_id: Uuid,
    pub version: u64,
    pub rules: Vec<PolicyRule>,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<String>,
    pub description: Option<String>,
}

/// Output of evaluating one pattern / rule against input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionResult {
    pub detected: bool,
    #[serde(rename = "type")]
    pub threat_type: Option<ThreatType>,
    pub confidence: f64,
    pub matched_patterns: Vec<String>,
    pub risk_level: RiskLevel,
    pub ml_classification: Option<MlClassification>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MlClassification {
    pub label: String,
    pub confidence: f64,
    pub distribution: Vec<(String, f64)>,
}

/// A single piece of evidence surfaced by a pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub threat_type: ThreatType,
    pub confidence: f64,
    pub risk_level: RiskLevel,
    pub description: String,
    pub source: String,
}

/// Result of the deep inspection pipeline (spec §3 invariant:
/// `passed == (risk_score < 0.7)`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InspectionResult {
    pub passed: bool,
    pub findings: Vec<Finding>,
    pub risk_score: f64,
    pub latency_ms: u64,
}

impl InspectionResult {
    pub const BLOCK_THRESHOLD: f64 = 0.7;

    pub fn new(findings: Vec<Finding>, risk_score: f64, latency_ms: u64) -> Self {
        Self {
            passed: risk_score < Self::BLOCK_THRESHOLD,
            findings,
            risk_score,
            latency_ms,
        }
    }
}

/// One turn in a session's conversation history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnInfo {
    pub message: String,
    pub intent: String,
    pub risk_score: f64,
    pub timestamp: DateTime<Utc>,
}

/// Per-session turn history, owned exclusively by the context analyzer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub session_id: String,
    pub turns: Vec<TurnInfo>,
    pub created_at: DateTime<Utc>,
    pub last_updated_at: DateTime<Utc>,
}

/// A document or query embedding, and the metadata needed to verify it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingVector {
    pub id: String,
    pub values: Vec<f32>,
    pub dimension: usize,
    pub source: Option<String>,
    pub checksum: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Internal,
    External,
    UserUpload,
    Api,
    Crawl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustLevel {
    Unknown,
    Untrusted,
    Standard,
    Trusted,
    Verified,
}

impl TrustLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.9 {
            Self::Verified
        } else if score >= 0.7 {
            Self::Trusted
        } else if score >= 0.4 {
            Self::Standard
        } else if score >= 0.2 {
            Self::Untrusted
        } else {
            Self::Unknown
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSource {
    pub source_type: SourceType,
    pub origin: String,
    pub domain: Option<String>,
    pub verified: bool,
    pub trust_weight: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvenanceEntry {
    pub action: String,
    pub timestamp: DateTime<Utc>,
    pub actor: Option<String>,
}

/// Trust-chain record for a RAG-ingested document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentProvenance {
    pub document_id: String,
    pub source: DocumentSource,
    pub chain: Vec<ProvenanceEntry>,
    pub trust_score: f64,
    pub trust_level: TrustLevel,
    pub last_verified: Option<DateTime<Utc>>,
}

/// An append-only request/decision record. Ring-buffered in memory
/// (cap 10,000, FIFO eviction) by `aegis-audit`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub request_id: Uuid,
    pub endpoint: String,
    pub decision: String,
    pub risk_score: f64,
    pub details: serde_json::Value,
}

/// An append-only threat record, same ring-buffer discipline as
/// [`AuditLogEntry`] but kept in a separate buffer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreatEvent {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub threat_type: ThreatType,
    pub risk_level: RiskLevel,
    pub source_component: String,
    pub details: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    BlockRate,
    ThreatCount,
    AvgLatency,
    ErrorRate,
    PiiCount,
    SensitiveCount,
    MlErrorRate,
    ActiveSessions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Gt,
    Gte,
    Lt,
    Lte,
    Eq,
    Neq,
}

impl Condition {
    pub fn test(self, value: f64, threshold: f64) -> bool {
        match self {
            Condition::Gt => value > threshold,
            Condition::Gte => value >= threshold,
            Condition::Lt => value < threshold,
            Condition::Lte => value <= threshold,
            Condition::Eq => (value - threshold).abs() < f64::EPSILON,
            Condition::Neq => (value - threshold).abs() >= f64::EPSILON,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertRule {
    pub id: String,
    pub metric: Metric,
    pub condition: Condition,
    pub threshold: f64,
    pub window_seconds: u64,
    pub cooldown_seconds: u64,
    pub severity: Severity,
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_fired: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: Uuid,
    pub rule_id: String,
    pub metric: Metric,
    pub value: f64,
    pub threshold: f64,
    pub severity: Severity,
    pub fired_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composite_depth_counts_leaves_as_one() {
        let leaf = Pattern::Regex {
            pattern: "x".into(),
            flags: None,
        };
        assert_eq!(leaf.depth(), 1);
        let nested = Pattern::Composite {
            operator: CompositeOperator::And,
            patterns: vec![leaf],
        };
        assert_eq!(nested.depth(), 2);
    }

    #[test]
    fn inspection_result_passed_matches_threshold() {
        let ok = InspectionResult::new(vec![], 0.69, 1);
        assert!(ok.passed);
        let blocked = InspectionResult::new(vec![], 0.7, 1);
        assert!(!blocked.passed);
    }

    #[test]
    fn trust_level_thresholds() {
        assert_eq!(TrustLevel::from_score(0.95), TrustLevel::Verified);
        assert_eq!(TrustLevel::from_score(0.75), TrustLevel::Trusted);
        assert_eq!(TrustLevel::from_score(0.5), TrustLevel::Standard);
        assert_eq!(TrustLevel::from_score(0.25), TrustLevel::Untrusted);
        assert_eq!(TrustLevel::from_score(0.1), TrustLevel::Unknown);
    }

    #[test]
    fn condition_test_matches_semantics() {
        assert!(Condition::Gt.test(5.0, 4.0));
        assert!(!Condition::Gt.test(4.0, 4.0));
        assert!(Condition::Gte.test(4.0, 4.0));
        assert!(Condition::Eq.test(4.0, 4.0));
    }
}
