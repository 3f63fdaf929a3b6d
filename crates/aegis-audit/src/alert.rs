//! The metric alert engine (spec §4.12): rules keyed on a metric +
//! condition + threshold, cooldown-gated firing, a bounded snapshot
//! history, and handler dispatch. Handlers are `Box<dyn Fn>` so
//! `aegis-api`/`aegis-cli` can wire a logging sink without the engine
//! depending on any particular destination (Prometheus registries are
//! out of scope).

use crate::ring::BoundedRing;
use aegis_core::{Alert, AlertRule, Condition, Metric};
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

const SNAPSHOT_HISTORY_CAPACITY: usize = 1000;

/// One point-in-time reading of every metric the alert engine
/// understands. Callers (the API layer, a periodic external driver)
/// compute this from the audit engine's stats and other counters.
#[derive(Debug, Clone)]
pub struct MetricSnapshot {
    pub values: HashMap<Metric, f64>,
}

impl MetricSnapshot {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    pub fn with(mut self, metric: Metric, value: f64) -> Self {
        self.values.insert(metric, value);
        self
    }
}

impl Default for MetricSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

type Handler = Box<dyn Fn(&Alert) + Send + Sync>;

pub struct AlertEngine {
    rules: Mutex<Vec<AlertRule>>,
    history: Mutex<BoundedRing<MetricSnapshot>>,
    handlers: Mutex<Vec<Handler>>,
}

impl Default for AlertEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl AlertEngine {
    pub fn new() -> Self {
        Self {
            rules: Mutex::new(Vec::new()),
            history: Mutex::new(BoundedRing::new(SNAPSHOT_HISTORY_CAPACITY)),
            handlers: Mutex::new(Vec::new()),
        }
    }

    pub async fn add_rule(&self, rule: AlertRule) {
        self.rules.lock().await.push(rule);
    }

    pub async fn rules(&self) -> Vec<AlertRule> {
        self.rules.lock().await.clone()
    }

    pub async fn register_handler(&self, handler: Handler) {
        self.handlers.lock().await.push(handler);
    }

    /// Records `snapshot` into the bounded history, then fires every
    /// enabled, not-in-cooldown rule whose condition the snapshot
    /// satisfies, dispatching each resulting [`Alert`] to every
    /// registered handler.
    pub async fn evaluate(&self, snapshot: MetricSnapshot) -> Vec<Alert> {
        self.history.lock().await.push(snapshot.clone());

        let now = Utc::now();
        let mut fired = Vec::new();
        let mut rules = self.rules.lock().await;
        for rule in rules.iter_mut() {
            if !rule.enabled {
                continue;
            }
            if let Some(last_fired) = rule.last_fired {
                let elapsed = (now - last_fired).num_seconds().max(0) as u64;
                if elapsed < rule.cooldown_seconds {
                    continue;
                }
            }
            let Some(&value) = snapshot.values.get(&rule.metric) else {
                continue;
            };
            if !rule.condition.test(value, rule.threshold) {
                continue;
            }
            let alert = Alert {
                id: Uuid::new_v4(),
                rule_id: rule.id.clone(),
                metric: rule.metric,
                value,
                threshold: rule.threshold,
                severity: rule.severity,
                fired_at: now,
            };
            rule.last_fired = Some(now);
            fired.push(alert);
        }
        drop(rules);

        let handlers = self.handlers.lock().await;
        for alert in &fired {
            for handler in handlers.iter() {
                handler(alert);
            }
        }
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aegis_core::Severity;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn rule(id: &str, metric: Metric, condition: Condition, threshold: f64, cooldown_seconds: u64) -> AlertRule {
        AlertRule {
            id: id.to_string(),
            metric,
            condition,
            threshold,
            window_seconds: 60,
            cooldown_seconds,
            severity: Severity::High,
            enabled: true,
            last_fired: None,
        }
    }

    #[tokio::test]
    async fn fires_when_condition_met() {
        let engine = AlertEngine::new();
        engine
            .add_rule(rule("high-block-rate", Metric::BlockRate, Condition::Gt, 0.1, 60))
            .await;
        let snapshot = MetricSnapshot::new().with(Metric::BlockRate, 0.2);
        let fired = engine.evaluate(snapshot).await;
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].rule_id, "high-block-rate");
    }

    #[tokio::test]
    async fn does_not_fire_again_during_cooldown() {
        let engine = AlertEngine::new();
        engine
            .add_rule(rule("high-block-rate", Metric::BlockRate, Condition::Gt, 0.1, 3600))
            .await;
        let snapshot = MetricSnapshot::new().with(Metric::BlockRate, 0.2);
        let first = engine.evaluate(snapshot.clone()).await;
        assert_eq!(first.len(), 1);
        let second = engine.evaluate(snapshot).await;
        assert!(second.is_empty());
    }

    #[tokio::test]
    async fn disabled_rule_never_fires() {
        let engine = AlertEngine::new();
        let mut disabled = rule("r", Metric::ErrorRate, Condition::Gt, 0.1, 0);
        disabled.enabled = false;
        engine.add_rule(disabled).await;
        let snapshot = MetricSnapshot::new().with(Metric::ErrorRate, 0.9);
        assert!(engine.evaluate(snapshot).await.is_empty());
    }

    #[tokio::test]
    async fn dispatches_to_all_registered_handlers() {
        let engine = AlertEngine::new();
        engine
            .add_rule(rule("r", Metric::ThreatCount, Condition::Gte, 5.0, 0))
            .await;
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_a = calls.clone();
        let calls_b = calls.clone();
        engine
            .register_handler(Box::new(move |_alert| {
                calls_a.fetch_add(1, Ordering::SeqCst);
            }))
            .await;
        engine
            .register_handler(Box::new(move |_alert| {
                calls_b.fetch_add(1, Ordering::SeqCst);
            }))
            .await;
        engine.evaluate(MetricSnapshot::new().with(Metric::ThreatCount, 5.0)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
