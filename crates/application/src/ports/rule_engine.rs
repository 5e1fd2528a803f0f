use ionman_dns_domain::RuleSnapshot;
use std::sync::Arc;

/// The classify engine as the reload path sees it: a place to publish
/// freshly assembled snapshots.
pub trait RuleEnginePort: Send + Sync {
    /// Atomically replace the active snapshot.
    fn publish(&self, snapshot: Arc<RuleSnapshot>);

    /// The snapshot currently being served.
    fn snapshot(&self) -> Arc<RuleSnapshot>;
}

/// Components that refresh their own file-backed state on a reload event
/// (e.g. the resolver re-reading its settings file).
#[async_trait::async_trait]
pub trait ReloadHook: Send + Sync {
    async fn reload(&self);
}
