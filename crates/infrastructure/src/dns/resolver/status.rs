use super::server::RecursiveResolver;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

const WRITE_INTERVAL: Duration = Duration::from_secs(3);

/// Writes the resolver's status JSON to a fixed path every few seconds
/// so the dashboard can poll it. On shutdown the document is replaced
/// with `{"running": false}`.
pub struct StatusWriter {
    path: PathBuf,
}

impl StatusWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn start(
        self,
        resolver: Arc<RecursiveResolver>,
        shutdown: CancellationToken,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(WRITE_INTERVAL);
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => {
                        let stopped = json!({ "running": false });
                        let _ = tokio::fs::write(&self.path, stopped.to_string()).await;
                        info!(path = %self.path.display(), "Status writer shut down");
                        return;
                    }
                    _ = interval.tick() => {
                        let document = resolver.status_document();
                        match serde_json::to_string(&document) {
                            Ok(raw) => {
                                if let Err(e) = tokio::fs::write(&self.path, raw).await {
                                    debug!(error = %e, "Status write failed");
                                }
                            }
                            Err(e) => debug!(error = %e, "Status serialization failed"),
                        }
                    }
                }
            }
        })
    }
}
