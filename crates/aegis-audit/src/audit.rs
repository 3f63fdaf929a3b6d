//! The audit log and threat-event ring buffers plus dashboard stats
//! (spec §4.12). Two independent `BoundedRing`s, each capacity 10,000,
//! FIFO eviction. Request/block counters are tracked separately from
//! the ring so the block rate stays accurate after old entries evict.

use crate::ring::BoundedRing;
use aegis_core::{AuditLogEntry, RiskLevel, ThreatEvent};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

pub const DEFAULT_CAPACITY: usize = 10_000;
const RECENT_EVENTS_COUNT: usize = 10;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct DashboardStats {
    pub total_requests: u64,
    pub blocked_requests: u64,
    pub block_rate: f64,
    pub risk_level: RiskLevel,
    pub threats_by_type: HashMap<String, u64>,
    pub recent_events: Vec<ThreatEvent>,
}

pub struct AuditEngine {
    logs: Mutex<BoundedRing<AuditLogEntry>>,
    threats: Mutex<BoundedRing<ThreatEvent>>,
    total_requests: AtomicU64,
    blocked_requests: AtomicU64,
}

impl AuditEngine {
    pub fn new(log_capacity: usize, threat_capacity: usize) -> Self {
        Self {
            logs: Mutex::new(BoundedRing::new(log_capacity)),
            threats: Mutex::new(BoundedRing::new(threat_capacity)),
            total_requests: AtomicU64::new(0),
            blocked_requests: AtomicU64::new(0),
        }
    }

    /// Records one inspected request. Fire-and-forget by convention
    /// (spec §7): callers never let an audit-write failure fail the
    /// request; since this is an in-memory ring, there is no failure
    /// mode to swallow.
    pub async fn log_request(&self, entry: AuditLogEntry, blocked: bool) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        if blocked {
            self.blocked_requests.fetch_add(1, Ordering::Relaxed);
        }
        self.logs.lock().await.push(entry);
    }

    pub async fn record_threat(&self, event: ThreatEvent) {
        self.threats.lock().await.push(event);
    }

    pub async fn logs(&self) -> Vec<AuditLogEntry> {
        self.logs.lock().await.iter().cloned().collect()
    }

    /// The last 10 threat events, newest first (spec §4.12).
    pub async fn recent_events(&self) -> Vec<ThreatEvent> {
        self.threats
            .lock()
            .await
            .last_n_newest_first(RECENT_EVENTS_COUNT)
            .into_iter()
            .cloned()
            .collect()
    }

    pub async fn threats_by_type(&self) -> HashMap<String, u64> {
        let mut counts: HashMap<String, u64> = HashMap::new();
        for event in self.threats.lock().await.iter() {
            *counts.entry(event.threat_type.as_str().to_string()).or_insert(0) += 1;
        }
        counts
    }

    fn risk_level_for(block_rate: f64) -> RiskLevel {
        if block_rate > 0.10 {
            RiskLevel::Critical
        } else if block_rate > 0.05 {
            RiskLevel::High
        } else if block_rate > 0.01 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub async fn get_stats(&self) -> DashboardStats {
        let total_requests = self.total_requests.load(Ordering::Relaxed);
        let blocked_requests = self.blocked_requests.load(Ordering::Relaxed);
        let block_rate = if total_requests == 0 {
            0.0
        } else {
            blocked_requests as f64 / total_requests as f64
        };
        DashboardStats {
            total_requests,
            blocked_requests,
            block_rate,
            risk_level: Self::risk_level_for(block_rate),
            threats_by_type: self.threats_by_type().await,
            recent_events: self.recent_events().await,
        }
    }
}

impl Default for AuditEngine {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aegis_core::ThreatType;
    use chrono::Utc;
    use uuid::Uuid;

    fn audit_entry(decision: &str) -> AuditLogEntry {
        AuditLogEntry {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            request_id: Uuid::new_v4(),
            endpoint: "/inspect".to_string(),
            decision: decision.to_string(),
            risk_score: 0.0,
            details: serde_json::json!({}),
        }
    }

    fn threat_event(threat_type: ThreatType) -> ThreatEvent {
        ThreatEvent {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            threat_type,
            risk_level: RiskLevel::High,
            source_component: "inspector".to_string(),
            details: serde_json::json!({}),
        }
    }

    #[tokio::test]
    async fn block_rate_above_ten_percent_is_critical() {
        let engine = AuditEngine::new(100, 100);
        for _ in 0..8 {
            engine.log_request(audit_entry("allow"), false).await;
        }
        for _ in 0..2 {
            engine.log_request(audit_entry("block"), true).await;
        }
        let stats = engine.get_stats().await;
        assert_eq!(stats.risk_level, RiskLevel::Critical);
    }

    #[tokio::test]
    async fn zero_requests_is_low_risk() {
        let engine = AuditEngine::new(100, 100);
        let stats = engine.get_stats().await;
        assert_eq!(stats.risk_level, RiskLevel::Low);
        assert_eq!(stats.block_rate, 0.0);
    }

    #[tokio::test]
    async fn recent_events_returns_last_ten_newest_first() {
        let engine = AuditEngine::new(100, 100);
        for _ in 0..15 {
            engine.record_threat(threat_event(ThreatType::Jailbreak)).await;
        }
        let recent = engine.recent_events().await;
        assert_eq!(recent.len(), 10);
    }

    #[tokio::test]
    async fn threats_by_type_aggregates_counts() {
        let engine = AuditEngine::new(100, 100);
        engine.record_threat(threat_event(ThreatType::Jailbreak)).await;
        engine.record_threat(threat_event(ThreatType::Jailbreak)).await;
        engine.record_threat(threat_event(ThreatType::DataExfiltration)).await;
        let counts = engine.threats_by_type().await;
        assert_eq!(counts.get("jailbreak"), Some(&2));
        assert_eq!(counts.get("data_exfiltration"), Some(&1));
    }
}
