use serde::{Deserialize, Serialize};

/// The closed seven-intent taxonomy (spec §4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Benign,
    OverrideInstructions,
    ExfiltrateData,
    JailbreakAttempt,
    RoleManipulation,
    ContextConfusion,
    GradualEscalation,
}

impl Intent {
    pub fn as_str(self) -> &'static str {
        match self {
            Intent::Benign => "benign",
            Intent::OverrideInstructions => "override_instructions",
            Intent::ExfiltrateData => "exfiltrate_data",
            Intent::JailbreakAttempt => "jailbreak_attempt",
            Intent::RoleManipulation => "role_manipulation",
            Intent::ContextConfusion => "context_confusion",
            Intent::GradualEscalation => "gradual_escalation",
        }
    }

    pub const NON_BENIGN: [Intent; 6] = [
        Intent::OverrideInstructions,
        Intent::ExfiltrateData,
        Intent::JailbreakAttempt,
        Intent::RoleManipulation,
        Intent::ContextConfusion,
        Intent::GradualEscalation,
    ];

    /// Fixed escalation risk used by the context analyzer (spec §4.4).
    pub fn escalation_risk(self) -> f64 {
        match self {
            Intent::Benign => 0.0,
            Intent::ContextConfusion => 0.3,
            Intent::RoleManipulation => 0.5,
            Intent::GradualEscalation => 0.6,
            Intent::OverrideInstructions => 0.8,
            Intent::ExfiltrateData => 0.9,
            Intent::JailbreakAttempt => 1.0,
        }
    }
}

/// Result of classifying one message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemanticResult {
    pub detected: bool,
    pub intent: Intent,
    pub confidence: f64,
    pub top_matches: Vec<(String, f64)>,
}

impl SemanticResult {
    pub fn benign() -> Self {
        Self {
            detected: false,
            intent: Intent::Benign,
            confidence: 0.0,
            top_matches: Vec::new(),
        }
    }
}
