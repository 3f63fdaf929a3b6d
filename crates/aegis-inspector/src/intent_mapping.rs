//! Intent -> (threat type, base risk level) table (spec §4.5 step 4).

use aegis_core::{RiskLevel, ThreatType};
use aegis_semantic::Intent;

pub fn threat_type_of(intent: Intent) -> ThreatType {
    match intent {
        Intent::Benign => ThreatType::Custom("benign".to_string()),
        Intent::OverrideInstructions => ThreatType::DirectInjection,
        Intent::ExfiltrateData => ThreatType::DataExfiltration,
        Intent::JailbreakAttempt => ThreatType::Jailbreak,
        Intent::RoleManipulation => ThreatType::RoleManipulation,
        Intent::ContextConfusion => ThreatType::ContextConfusion,
        Intent::GradualEscalation => ThreatType::GradualEscalation,
    }
}

pub fn base_risk_level_of(intent: Intent) -> RiskLevel {
    match intent {
        Intent::Benign => RiskLevel::Low,
        Intent::JailbreakAttempt => RiskLevel::Critical,
        Intent::ExfiltrateData => RiskLevel::High,
        Intent::OverrideInstructions => RiskLevel::High,
        Intent::RoleManipulation => RiskLevel::Medium,
        Intent::ContextConfusion => RiskLevel::Medium,
        Intent::GradualEscalation => RiskLevel::Medium,
    }
}
