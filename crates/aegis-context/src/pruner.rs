//! Background session pruner (spec §4.4, §5): runs every
//! `pruner_interval_secs`, evicts sessions idle past `session_ttl_secs`,
//! and must be cancellable for clean shutdown.

use crate::analyzer::ContextAnalyzer;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

pub struct PrunerHandle {
    handle: JoinHandle<()>,
}

impl PrunerHandle {
    /// Cancels the background pruner. Lifecycle: spawned at startup
    /// after config load, cancelled on shutdown (spec §9).
    pub fn cancel(self) {
        self.handle.abort();
    }
}

pub fn spawn_pruner(analyzer: Arc<ContextAnalyzer>, interval_secs: u64) -> PrunerHandle {
    let handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
        loop {
            ticker.tick().await;
            let evicted = analyzer.prune_expired().await;
            if evicted > 0 {
                tracing::debug!(evicted, "context pruner evicted expired sessions");
            }
        }
    });
    PrunerHandle { handle }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aegis_core::ContextConfig;
    use aegis_semantic::SemanticAnalyzer;

    #[tokio::test(start_paused = true)]
    async fn pruner_can_be_cancelled_without_panicking() {
        let analyzer = Arc::new(ContextAnalyzer::new(
            Arc::new(SemanticAnalyzer::default()),
            ContextConfig::default(),
        ));
        let pruner = spawn_pruner(analyzer, 300);
        pruner.cancel();
    }
}
