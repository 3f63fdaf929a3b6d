//! The context analyzer facade (spec §4.4). The session map is owned
//! exclusively here (spec §9 "session map ownership") — external callers
//! interact only through `analyze`, `clear_session`, and the pruner.

use crate::signals::{cumulative_risk, drift_metrics, split_injection_score};
use aegis_core::{ContextConfig, SessionState, TurnInfo};
use aegis_semantic::SemanticAnalyzer;
use chrono::{Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

#[derive(Debug, Clone)]
pub struct ContextResult {
    pub cumulative_risk_score: f64,
    pub patterns: Vec<String>,
    pub intent: String,
    pub confidence: f64,
}

pub struct ContextAnalyzer {
    sessions: RwLock<HashMap<String, Arc<Mutex<SessionState>>>>,
    semantic: Arc<SemanticAnalyzer>,
    config: ContextConfig,
}

impl ContextAnalyzer {
    pub fn new(semantic: Arc<SemanticAnalyzer>, config: ContextConfig) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            semantic,
            config,
        }
    }

    async fn session_handle(&self, session_id: &str) -> Arc<Mutex<SessionState>> {
        if let Some(existing) = self.sessions.read().await.get(session_id) {
            return existing.clone();
        }
        let mut sessions = self.sessions.write().await;
        sessions
            .entry(session_id.to_string())
            .or_insert_with(|| {
                let now = Utc::now();
                Arc::new(Mutex::new(SessionState {
                    session_id: session_id.to_string(),
                    turns: Vec::new(),
                    created_at: now,
                    last_updated_at: now,
                }))
            })
            .clone()
    }

    pub async fn clear_session(&self, session_id: &str) {
        self.sessions.write().await.remove(session_id);
    }

    /// Removes sessions idle longer than `sessionTTL` (called by the
    /// pruner, but also usable directly in tests).
    pub async fn prune_expired(&self) -> usize {
        let ttl = Duration::seconds(self.config.session_ttl_secs as i64);
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let mut expired = Vec::new();
        for (id, state) in sessions.iter() {
            let last_updated = state.lock().await.last_updated_at;
            if now - last_updated > ttl {
                expired.push(id.clone());
            }
        }
        for id in &expired {
            sessions.remove(id);
        }
        expired.len()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    fn classify_turn(&self, message: &str) -> TurnInfo {
        let result = self.semantic.analyze(message);
        TurnInfo {
            message: message.to_string(),
            intent: result.intent.as_str().to_string(),
            risk_score: result.intent.escalation_risk() * result.confidence.max(if result.detected { 1.0 } else { 0.0 }),
            timestamp: Utc::now(),
        }
    }

    /// Analyzes one incoming turn (spec §4.4 steps 1-6).
    pub async fn analyze(
        &self,
        session_id: &str,
        message: &str,
        history: Option<&[String]>,
    ) -> ContextResult {
        let handle = self.session_handle(session_id).await;
        let mut state = handle.lock().await;

        if let Some(history) = history {
            if state.turns.is_empty() {
                let base = Utc::now() - Duration::seconds(history.len() as i64);
                for (i, entry) in history.iter().enumerate() {
                    let mut turn = self.classify_turn(entry);
                    turn.timestamp = base + Duration::seconds(i as i64);
                    state.turns.push(turn);
                }
            }
        }

        let current = self.classify_turn(message);
        let intent = current.intent.clone();
        let confidence = current.risk_score;
        state.turns.push(current);

        let max_turns = self.config.max_history_turns;
        if state.turns.len() > max_turns {
            let drop = state.turns.len() - max_turns;
            state.turns.drain(0..drop);
        }
        state.last_updated_at = Utc::now();

        let drift = drift_metrics(&state.turns);
        let cumulative = cumulative_risk(&state.turns, self.config.escalation_threshold);
        let s_s = split_injection_score(&state.turns);

        let mut patterns = Vec::new();
        if drift.escalation_score >= self.config.escalation_threshold {
            patterns.push("gradual_escalation".to_string());
        }
        if s_s > 0.0 {
            patterns.push("split_injection".to_string());
        }
        if drift.intent_shift >= self.config.drift_threshold {
            patterns.push("context_confusion".to_string());
        }

        ContextResult {
            cumulative_risk_score: cumulative,
            patterns,
            intent,
            confidence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_turn_creates_session() {
        let analyzer = ContextAnalyzer::new(Arc::new(SemanticAnalyzer::default()), ContextConfig::default());
        let result = analyzer.analyze("s1", "hello there", None).await;
        assert_eq!(analyzer.session_count().await, 1);
        assert!(result.cumulative_risk_score >= 0.0);
    }

    #[tokio::test]
    async fn history_backfills_empty_session() {
        let analyzer = ContextAnalyzer::new(Arc::new(SemanticAnalyzer::default()), ContextConfig::default());
        let history = vec!["hello".to_string(), "how are you".to_string()];
        analyzer.analyze("s2", "fine thanks", Some(&history)).await;
        let handle = analyzer.session_handle("s2").await;
        let state = handle.lock().await;
        assert_eq!(state.turns.len(), 3);
    }

    #[tokio::test]
    async fn turns_trimmed_to_max_history() {
        let mut config = ContextConfig::default();
        config.max_history_turns = 2;
        let analyzer = ContextAnalyzer::new(Arc::new(SemanticAnalyzer::default()), config);
        for i in 0..5 {
            analyzer.analyze("s3", &format!("message {i}"), None).await;
        }
        let handle = analyzer.session_handle("s3").await;
        let state = handle.lock().await;
        assert_eq!(state.turns.len(), 2);
    }

    #[tokio::test]
    async fn clear_session_removes_state() {
        let analyzer = ContextAnalyzer::new(Arc::new(SemanticAnalyzer::default()), ContextConfig::default());
        analyzer.analyze("s4", "hi", None).await;
        analyzer.clear_session("s4").await;
        assert_eq!(analyzer.session_count().await, 0);
    }
}
