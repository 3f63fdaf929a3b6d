//! The policy store (spec §4.11): ordered rule CRUD, versioned
//! snapshots, rollback, and change notifications. Generalizes the
//! teacher's registry-guard CRUD/versioned-snapshot shape to an
//! in-memory rule set (no persistence: the spec does not ask policies
//! to survive a process restart, and `reload` from YAML is an external
//! file contract fixed by the wire API, not implemented here).

use crate::error::{PolicyError, Result};
use aegis_core::{PolicyRule, PolicyVersion};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

/// Broadcast to observers (`aegis-inspector`, `aegis-rag`) on every rule
/// mutation, so policy changes apply without polling.
#[derive(Debug, Clone)]
pub enum PolicyEvent {
    RuleAdded(String),
    RuleUpdated(String),
    RuleRemoved(String),
    RolledBack(u64),
}

#[derive(Default)]
struct PolicyState {
    rules: Vec<PolicyRule>,
    versions: Vec<PolicyVersion>,
    next_version: u64,
}

impl PolicyState {
    fn resort(&mut self) {
        self.rules.sort_by(|a, b| b.priority.cmp(&a.priority));
    }
}

pub struct PolicyStore {
    state: Arc<RwLock<PolicyState>>,
    events: broadcast::Sender<PolicyEvent>,
}

impl Default for PolicyStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PolicyStore {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(256);
        Self {
            state: Arc::new(RwLock::new(PolicyState::default())),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PolicyEvent> {
        self.events.subscribe()
    }

    fn notify(&self, event: PolicyEvent) {
        // No subscribers is not an error; the store doesn't require a
        // listener to be useful standalone (tests, CLI one-shots).
        let _ = self.events.send(event);
    }

    pub async fn add_rule(&self, rule: PolicyRule) {
        let id = rule.id.clone();
        let mut state = self.state.write().await;
        state.rules.push(rule);
        state.resort();
        drop(state);
        self.notify(PolicyEvent::RuleAdded(id));
    }

    pub async fn update_rule(&self, rule: PolicyRule) -> Result<()> {
        let id = rule.id.clone();
        let mut state = self.state.write().await;
        let Some(existing) = state.rules.iter_mut().find(|r| r.id == rule.id) else {
            return Err(PolicyError::NotFound(format!("policy rule '{id}' not found")));
        };
        let next_version = existing.version + 1;
        *existing = rule;
        existing.version = next_version;
        existing.updated_at = Utc::now();
        state.resort();
        drop(state);
        self.notify(PolicyEvent::RuleUpdated(id));
        Ok(())
    }

    pub async fn remove_rule(&self, id: &str) -> Result<()> {
        let mut state = self.state.write().await;
        let before = state.rules.len();
        state.rules.retain(|r| r.id != id);
        if state.rules.len() == before {
            return Err(PolicyError::NotFound(format!("policy rule '{id}' not found")));
        }
        drop(state);
        self.notify(PolicyEvent::RuleRemoved(id.to_string()));
        Ok(())
    }

    pub async fn get_rule(&self, id: &str) -> Option<PolicyRule> {
        self.state.read().await.rules.iter().find(|r| r.id == id).cloned()
    }

    /// Snapshot of the active, priority-sorted rule list.
    pub async fn list_rules(&self) -> Vec<PolicyRule> {
        self.state.read().await.rules.clone()
    }

    /// Deep-copies the current rules into a new monotonically-numbered
    /// version (spec §4.11).
    pub async fn create_version(&self, description: Option<String>, created_by: Option<String>) -> PolicyVersion {
        let mut state = self.state.write().await;
        state.next_version += 1;
        let version = PolicyVersion {
            version_id: Uuid::new_v4(),
            version: state.next_version,
            rules: state.rules.clone(),
            created_at: Utc::now(),
            created_by,
            description,
        };
        state.versions.push(version.clone());
        version
    }

    pub async fn list_versions(&self) -> Vec<PolicyVersion> {
        self.state.read().await.versions.clone()
    }

    pub async fn get_version(&self, version_id: Uuid) -> Option<PolicyVersion> {
        self.state
            .read()
            .await
            .versions
            .iter()
            .find(|v| v.version_id == version_id)
            .cloned()
    }

    /// Auto-captures the pre-rollback state as a version, then replaces
    /// the current rule list with a deep copy of the target version's
    /// rules and re-sorts (spec §4.11).
    pub async fn rollback(&self, version_id: Uuid) -> Result<PolicyVersion> {
        let mut state = self.state.write().await;
        let Some(target) = state.versions.iter().find(|v| v.version_id == version_id).cloned() else {
            return Err(PolicyError::NotFound(format!("policy version '{version_id}' not found")));
        };

        state.next_version += 1;
        let pre_rollback = PolicyVersion {
            version_id: Uuid::new_v4(),
            version: state.next_version,
            rules: state.rules.clone(),
            created_at: Utc::now(),
            created_by: None,
            description: Some(format!("pre-rollback snapshot (rolling back to version {})", target.version)),
        };
        state.versions.push(pre_rollback);

        state.rules = target.rules.clone();
        state.resort();
        let target_version = target.version;
        drop(state);
        self.notify(PolicyEvent::RolledBack(target_version));
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aegis_core::{Action, Severity, ThreatType};

    fn rule(id: &str, priority: i32) -> PolicyRule {
        PolicyRule {
            id: id.to_string(),
            name: id.to_string(),
            description: String::new(),
            category: ThreatType::DirectInjection,
            severity: Severity::High,
            action: Action::Block,
            is_active: true,
            priority,
            patterns: Vec::new(),
            version: 1,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn rules_are_sorted_by_priority_descending() {
        let store = PolicyStore::new();
        store.add_rule(rule("low", 1)).await;
        store.add_rule(rule("high", 10)).await;
        store.add_rule(rule("mid", 5)).await;
        let rules = store.list_rules().await;
        assert_eq!(rules.iter().map(|r| r.id.as_str()).collect::<Vec<_>>(), vec!["high", "mid", "low"]);
    }

    #[tokio::test]
    async fn rollback_restores_prior_rules_and_captures_pre_rollback_version() {
        let store = PolicyStore::new();
        store.add_rule(rule("a", 1)).await;
        let v1 = store.create_version(None, None).await;
        store.add_rule(rule("b", 2)).await;
        assert_eq!(store.list_rules().await.len(), 2);

        let restored = store.rollback(v1.version_id).await.unwrap();
        assert_eq!(restored.rules.len(), 1);
        assert_eq!(store.list_rules().await.len(), 1);

        let versions = store.list_versions().await;
        assert!(versions.iter().any(|v| v.description.as_deref().unwrap_or("").starts_with("pre-rollback")));
    }

    #[tokio::test]
    async fn update_increments_rule_version_and_touches_updated_at() {
        let store = PolicyStore::new();
        store.add_rule(rule("a", 1)).await;
        let mut updated = rule("a", 1);
        updated.description = "changed".to_string();
        store.update_rule(updated).await.unwrap();
        let stored = store.get_rule("a").await.unwrap();
        assert_eq!(stored.version, 2);
        assert_eq!(stored.description, "changed");
    }

    #[tokio::test]
    async fn update_unknown_rule_is_not_found() {
        let store = PolicyStore::new();
        let err = store.update_rule(rule("missing", 1)).await.unwrap_err();
        assert!(matches!(err, PolicyError::NotFound(_)));
    }

    #[tokio::test]
    async fn mutations_are_broadcast() {
        let store = PolicyStore::new();
        let mut rx = store.subscribe();
        store.add_rule(rule("a", 1)).await;
        let event = rx.recv().await.unwrap();
        assert!(matches!(event, PolicyEvent::RuleAdded(id) if id == "a"));
    }
}
