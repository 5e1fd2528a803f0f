use crate::{PortSyncJob, ReloadJob};
use std::sync::Arc;
use tracing::info;

/// Central orchestrator for the background jobs.
///
/// Register jobs with the builder, then call `.start()` once.
pub struct JobRunner {
    reload: Option<ReloadJob>,
    port_sync: Option<PortSyncJob>,
}

impl JobRunner {
    pub fn new() -> Self {
        Self {
            reload: None,
            port_sync: None,
        }
    }

    pub fn with_reload(mut self, job: ReloadJob) -> Self {
        self.reload = Some(job);
        self
    }

    pub fn with_port_sync(mut self, job: PortSyncJob) -> Self {
        self.port_sync = Some(job);
        self
    }

    /// Start all registered background jobs.
    pub async fn start(self) {
        info!("Starting background job runner");

        if let Some(job) = self.reload {
            Arc::new(job).start().await;
        }

        if let Some(job) = self.port_sync {
            Arc::new(job).start().await;
        }

        info!("All background jobs started");
    }
}

impl Default for JobRunner {
    fn default() -> Self {
        Self::new()
    }
}
