use ionman_dns_application::ports::PortRuleSyncPort;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Timer- and trigger-driven firewall reconciliation.
///
/// Cycles run inline in one task, so two can never overlap: a tick or
/// trigger arriving mid-cycle is coalesced into at most one extra run.
/// Every `autodetect_cycles`-th cycle runs game auto-detect first.
pub struct PortSyncJob {
    sync: Arc<dyn PortRuleSyncPort>,
    trigger: Arc<Notify>,
    interval_secs: u64,
    autodetect_cycles: u32,
    shutdown: CancellationToken,
}

impl PortSyncJob {
    pub fn new(sync: Arc<dyn PortRuleSyncPort>, trigger: Arc<Notify>) -> Self {
        Self {
            sync,
            trigger,
            interval_secs: 30,
            autodetect_cycles: 10,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_interval(mut self, interval_secs: u64) -> Self {
        self.interval_secs = interval_secs;
        self
    }

    /// 0 disables auto-detect.
    pub fn with_autodetect_cycles(mut self, cycles: u32) -> Self {
        self.autodetect_cycles = cycles;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub async fn start(self: Arc<Self>) {
        info!(
            interval_secs = self.interval_secs,
            autodetect_cycles = self.autodetect_cycles,
            "Starting port sync job"
        );

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            interval.tick().await;

            let mut cycle = 0u32;
            loop {
                tokio::select! {
                    _ = self.shutdown.cancelled() => {
                        info!("PortSyncJob: shutting down");
                        break;
                    }
                    _ = interval.tick() => {}
                    _ = self.trigger.notified() => {}
                }

                cycle = cycle.wrapping_add(1);
                if self.autodetect_cycles > 0 && cycle % self.autodetect_cycles == 0 {
                    match self.sync.autodetect().await {
                        Ok(0) => {}
                        Ok(added) => info!(added, "Auto-detect added new games"),
                        Err(e) => error!(error = %e, "Auto-detect failed"),
                    }
                }

                if let Err(e) = self.sync.sync().await {
                    error!(error = %e, "Port rule sync failed");
                }
            }
        });
    }
}
