use super::cache::CacheStats;
use ionman_dns_domain::config::ResolverSettings;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Instant;

/// Upstream latencies kept for the running average.
const LATENCY_WINDOW: usize = 1000;

/// Running resolver counters plus a bounded window of upstream latencies.
pub struct ResolverStats {
    started_at: Instant,
    total: AtomicU64,
    cached: AtomicU64,
    forwarded: AtomicU64,
    errors: AtomicU64,
    nxdomain: AtomicU64,
    latencies: Mutex<VecDeque<f64>>,
}

impl ResolverStats {
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
            total: AtomicU64::new(0),
            cached: AtomicU64::new(0),
            forwarded: AtomicU64::new(0),
            errors: AtomicU64::new(0),
            nxdomain: AtomicU64::new(0),
            latencies: Mutex::new(VecDeque::with_capacity(LATENCY_WINDOW)),
        }
    }

    pub fn record_cached(&self) {
        self.total.fetch_add(1, Ordering::Relaxed);
        self.cached.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_forwarded(&self, upstream_ms: f64, nxdomain: bool) {
        self.total.fetch_add(1, Ordering::Relaxed);
        self.forwarded.fetch_add(1, Ordering::Relaxed);
        if nxdomain {
            self.nxdomain.fetch_add(1, Ordering::Relaxed);
        }
        let mut window = self.latencies.lock().unwrap();
        if window.len() == LATENCY_WINDOW {
            window.pop_front();
        }
        window.push_back(upstream_ms);
    }

    pub fn record_error(&self) {
        self.total.fetch_add(1, Ordering::Relaxed);
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn avg_upstream_ms(&self) -> f64 {
        let window = self.latencies.lock().unwrap();
        if window.is_empty() {
            return 0.0;
        }
        let avg = window.iter().sum::<f64>() / window.len() as f64;
        (avg * 10.0).round() / 10.0
    }

    pub fn snapshot(
        &self,
        listen: String,
        cache: CacheStats,
        config: ResolverSettings,
    ) -> StatusDocument {
        StatusDocument {
            running: true,
            uptime_seconds: self.started_at.elapsed().as_secs(),
            listen,
            total_queries: self.total.load(Ordering::Relaxed),
            cached_queries: self.cached.load(Ordering::Relaxed),
            forwarded_queries: self.forwarded.load(Ordering::Relaxed),
            error_queries: self.errors.load(Ordering::Relaxed),
            nxdomain_queries: self.nxdomain.load(Ordering::Relaxed),
            avg_upstream_ms: self.avg_upstream_ms(),
            cache,
            config,
        }
    }
}

impl Default for ResolverStats {
    fn default() -> Self {
        Self::new()
    }
}

/// The JSON document the status sink consumes.
#[derive(Debug, Clone, Serialize)]
pub struct StatusDocument {
    pub running: bool,
    pub uptime_seconds: u64,
    pub listen: String,
    pub total_queries: u64,
    pub cached_queries: u64,
    pub forwarded_queries: u64,
    pub error_queries: u64,
    pub nxdomain_queries: u64,
    pub avg_upstream_ms: f64,
    pub cache: CacheStats,
    pub config: ResolverSettings,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let stats = ResolverStats::new();
        stats.record_cached();
        stats.record_forwarded(10.0, false);
        stats.record_forwarded(20.0, true);
        stats.record_error();

        assert_eq!(stats.total.load(Ordering::Relaxed), 4);
        assert_eq!(stats.cached.load(Ordering::Relaxed), 1);
        assert_eq!(stats.forwarded.load(Ordering::Relaxed), 2);
        assert_eq!(stats.nxdomain.load(Ordering::Relaxed), 1);
        assert_eq!(stats.errors.load(Ordering::Relaxed), 1);
        assert_eq!(stats.avg_upstream_ms(), 15.0);
    }

    #[test]
    fn latency_window_is_bounded() {
        let stats = ResolverStats::new();
        for i in 0..1500 {
            stats.record_forwarded(i as f64, false);
        }
        let window = stats.latencies.lock().unwrap();
        assert_eq!(window.len(), LATENCY_WINDOW);
        // Oldest 500 samples were displaced.
        assert_eq!(*window.front().unwrap(), 500.0);
    }

    #[test]
    fn status_document_serializes_with_expected_keys() {
        let stats = ResolverStats::new();
        stats.record_cached();
        let doc = stats.snapshot(
            "127.0.0.1:5300".to_string(),
            CacheStats {
                size: 1,
                maxsize: 5000,
                hits: 1,
                misses: 0,
                hit_rate: 100.0,
            },
            ResolverSettings::default(),
        );
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["running"], true);
        assert_eq!(json["cached_queries"], 1);
        assert_eq!(json["cache"]["maxsize"], 5000);
        assert!(json["config"]["upstreams"].is_array());
    }
}
