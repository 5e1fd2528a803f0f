use crate::dns::transport::create_transport;
use ionman_dns_domain::config::ResolverSettings;
use ionman_dns_domain::DomainError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Round-robin upstream selection. Each attempt gets the configured
/// per-attempt timeout; the first upstream to answer wins.
pub struct UpstreamPool {
    next: AtomicUsize,
}

impl UpstreamPool {
    pub fn new() -> Self {
        Self {
            next: AtomicUsize::new(0),
        }
    }

    /// Forward `message_bytes` to the upstreams in rotation. Returns the
    /// raw response and the elapsed upstream time in milliseconds.
    pub async fn resolve(
        &self,
        settings: &ResolverSettings,
        message_bytes: &[u8],
    ) -> Result<(Vec<u8>, f64), DomainError> {
        let upstreams = &settings.upstreams;
        if upstreams.is_empty() {
            return Err(DomainError::UpstreamFailed("no upstreams configured".into()));
        }

        let timeout = Duration::from_millis(settings.timeout_ms);
        for _ in 0..upstreams.len() {
            let index = self.next.fetch_add(1, Ordering::Relaxed) % upstreams.len();
            let upstream = &upstreams[index];
            let transport = create_transport(upstream);

            let started = Instant::now();
            match transport.send(message_bytes, timeout).await {
                Ok(response) => {
                    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
                    debug!(
                        upstream = upstream.display_name(),
                        protocol = response.protocol_used,
                        elapsed_ms,
                        "Upstream answered"
                    );
                    return Ok((response.bytes, elapsed_ms));
                }
                Err(e) => {
                    warn!(
                        upstream = upstream.display_name(),
                        error = %e,
                        "Upstream attempt failed"
                    );
                }
            }
        }

        Err(DomainError::UpstreamFailed("all upstreams exhausted".into()))
    }
}

impl Default for UpstreamPool {
    fn default() -> Self {
        Self::new()
    }
}
