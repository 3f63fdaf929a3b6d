//! The three context-risk signals (spec §4.4 step 5): escalation,
//! split-injection, and drift.

use aegis_core::TurnInfo;

/// Fixed fragment sets that, spread across turns, indicate a prompt
/// injection deliberately split to dodge single-message pattern checks.
const FRAGMENT_SETS: &[&[&str]] = &[
    &["ignore", "previous", "instructions"],
    &["reveal", "system", "prompt"],
    &["disable", "safety", "filters"],
    &["이전", "지시", "무시"],
];

/// Escalation score `s_e` (spec §4.4): requires >=3 turns.
pub fn escalation_score(turns: &[TurnInfo]) -> f64 {
    if turns.len() < 3 {
        return 0.0;
    }
    let risks: Vec<f64> = turns.iter().map(|t| t.risk_score).collect();
    let increasing_pairs = risks.windows(2).filter(|w| w[1] > w[0]).count();
    let trend = increasing_pairs as f64 / (risks.len() - 1) as f64;
    let delta = risks.last().unwrap() - risks.first().unwrap();
    (0.4 * trend + 0.6 * delta).clamp(0.0, 1.0)
}

/// Split-injection score `s_s` (spec §4.4): note this preserves the
/// documented quirk (spec §9) of combining the last <=5 turns into one
/// lowercase string before checking "spread across turns" — a single
/// turn containing every fragment can still match.
pub fn split_injection_score(turns: &[TurnInfo]) -> f64 {
    let window: Vec<&TurnInfo> = turns.iter().rev().take(5).collect();
    if window.is_empty() {
        return 0.0;
    }
    let combined: String = window
        .iter()
        .map(|t| t.message.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ");

    let mut hits = 0usize;
    for fragments in FRAGMENT_SETS {
        let all_present_combined = fragments.iter().all(|f| combined.contains(f));
        if !all_present_combined {
            continue;
        }
        let spread_across_turns = fragments.iter().any(|f| {
            window
                .iter()
                .any(|t| !t.message.to_lowercase().contains(f))
        });
        if spread_across_turns {
            hits += 1;
        }
    }

    if hits > 0 {
        (0.7 + 0.1 * hits as f64).min(1.0)
    } else {
        0.0
    }
}

/// Drift metrics (spec §4.4): intent-shift ratio and topic coherence
/// from message-length variance.
pub struct DriftMetrics {
    pub intent_shift: f64,
    pub topic_coherence: f64,
    pub escalation_score: f64,
}

pub fn drift_metrics(turns: &[TurnInfo]) -> DriftMetrics {
    let escalation = escalation_score(turns);
    if turns.len() < 2 {
        return DriftMetrics {
            intent_shift: 0.0,
            topic_coherence: 1.0,
            escalation_score: escalation,
        };
    }
    let changes = turns
        .windows(2)
        .filter(|w| w[0].intent != w[1].intent)
        .count();
    let intent_shift = changes as f64 / (turns.len() - 1) as f64;

    let lengths: Vec<f64> = turns.iter().map(|t| t.message.chars().count() as f64).collect();
    let mean = lengths.iter().sum::<f64>() / lengths.len() as f64;
    let variance = lengths.iter().map(|l| (l - mean).powi(2)).sum::<f64>() / lengths.len() as f64;
    let topic_coherence = (1.0 - (variance / 10_000.0).min(1.0)).max(0.0);

    DriftMetrics {
        intent_shift,
        topic_coherence,
        escalation_score: escalation,
    }
}

/// Cumulative risk (spec §4.4 step 6).
pub fn cumulative_risk(turns: &[TurnInfo], escalation_threshold: f64) -> f64 {
    let s_e = escalation_score(turns);
    let s_s = split_injection_score(turns);
    let gated_se = if s_e >= escalation_threshold { s_e } else { 0.0 };

    let risks: Vec<f64> = turns.iter().map(|t| t.risk_score).collect();
    let avg_risk = if risks.is_empty() {
        0.0
    } else {
        risks.iter().sum::<f64>() / risks.len() as f64
    };
    let max_risk = risks.iter().cloned().fold(0.0, f64::max);

    gated_se
        .max(s_s)
        .max((avg_risk + max_risk) / 2.0)
        .clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn turn(message: &str, intent: &str, risk: f64) -> TurnInfo {
        TurnInfo {
            message: message.to_string(),
            intent: intent.to_string(),
            risk_score: risk,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn escalation_requires_three_turns() {
        let turns = vec![turn("a", "benign", 0.0), turn("b", "benign", 0.5)];
        assert_eq!(escalation_score(&turns), 0.0);
    }

    #[test]
    fn escalation_rises_with_increasing_risk() {
        let turns = vec![
            turn("a", "benign", 0.0),
            turn("b", "role_manipulation", 0.5),
            turn("c", "jailbreak_attempt", 1.0),
        ];
        assert!(escalation_score(&turns) > 0.5);
    }

    #[test]
    fn split_injection_detects_fragments_spread_across_turns() {
        let turns = vec![
            turn("please ignore", "benign", 0.1),
            turn("the previous", "benign", 0.1),
            turn("instructions now", "benign", 0.1),
        ];
        assert!(split_injection_score(&turns) > 0.0);
    }

    #[test]
    fn split_injection_zero_when_fragments_absent() {
        let turns = vec![turn("hello there", "benign", 0.0)];
        assert_eq!(split_injection_score(&turns), 0.0);
    }
}
