//! Risk-level weighting local to the deep inspector (spec §4.5 step 3).
//! Other components (RAG, MCP) use their own weight tables — these are
//! deliberately not unified into one canonical table in `aegis-core`.

use aegis_core::RiskLevel;

pub fn weight(level: RiskLevel) -> f64 {
    match level {
        RiskLevel::Low => 0.1,
        RiskLevel::Medium => 0.4,
        RiskLevel::High => 0.9,
        RiskLevel::Critical => 1.0,
    }
}

/// Bumps a risk level one step up, capped at `Critical` (spec §4.5 step
/// 4: "bumped one step when confidence >= 0.9, never above critical").
pub fn bump_one_step(level: RiskLevel) -> RiskLevel {
    match level {
        RiskLevel::Low => RiskLevel::Medium,
        RiskLevel::Medium => RiskLevel::High,
        RiskLevel::High => RiskLevel::Critical,
        RiskLevel::Critical => RiskLevel::Critical,
    }
}
