use ionman_dns_application::ports::{ReloadHook, RuleEnginePort};
use ionman_dns_application::RuleStoreAdapter;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Hot-reload supervisor.
///
/// Fires on a periodic tick and on an external trigger (the CLI notifies
/// it from its SIGHUP handler). Each firing runs the registered reload
/// hooks, pulls a fresh snapshot from the rule store adapter, publishes
/// it atomically to the rule engine, and nudges the port-sync job.
pub struct ReloadJob {
    adapter: Arc<RuleStoreAdapter>,
    engine: Arc<dyn RuleEnginePort>,
    hooks: Vec<Arc<dyn ReloadHook>>,
    reload_trigger: Arc<Notify>,
    port_sync_trigger: Arc<Notify>,
    interval_secs: u64,
    shutdown: CancellationToken,
}

impl ReloadJob {
    pub fn new(
        adapter: Arc<RuleStoreAdapter>,
        engine: Arc<dyn RuleEnginePort>,
        reload_trigger: Arc<Notify>,
        port_sync_trigger: Arc<Notify>,
    ) -> Self {
        Self {
            adapter,
            engine,
            hooks: Vec::new(),
            reload_trigger,
            port_sync_trigger,
            interval_secs: 30,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_interval(mut self, interval_secs: u64) -> Self {
        self.interval_secs = interval_secs;
        self
    }

    pub fn with_hook(mut self, hook: Arc<dyn ReloadHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub async fn start(self: Arc<Self>) {
        info!(interval_secs = self.interval_secs, "Starting reload job");

        // Initial load so the engines never serve the empty boot snapshot
        // longer than necessary.
        self.reload_once().await;

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            interval.tick().await;

            loop {
                tokio::select! {
                    _ = self.shutdown.cancelled() => {
                        info!("ReloadJob: shutting down");
                        break;
                    }
                    _ = interval.tick() => {
                        self.reload_once().await;
                    }
                    _ = self.reload_trigger.notified() => {
                        info!("ReloadJob: external reload requested");
                        self.reload_once().await;
                    }
                }
            }
        });
    }

    async fn reload_once(&self) {
        for hook in &self.hooks {
            hook.reload().await;
        }
        let snapshot = self.adapter.refresh().await;
        self.engine.publish(snapshot);
        self.port_sync_trigger.notify_one();
    }
}
