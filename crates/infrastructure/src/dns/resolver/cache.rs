use hickory_proto::rr::Record;
use lru::LruCache;
use serde::Serialize;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Instant;

#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub size: usize,
    pub maxsize: usize,
    pub hits: u64,
    pub misses: u64,
    /// Hit percentage, one decimal.
    pub hit_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    qname: String,
    qtype: String,
}

struct CachedAnswer {
    records: Vec<Record>,
    expires_at: Instant,
}

/// TTL-respecting LRU answer cache.
///
/// One mutex guards order and map; critical sections only touch the map,
/// never I/O. `get` promotes to most-recently-used and evicts entries
/// whose absolute expiry has passed; `put` evicts the least-recently-used
/// entry beyond capacity.
pub struct DnsCache {
    inner: Mutex<LruCache<CacheKey, CachedAnswer>>,
    maxsize: usize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl DnsCache {
    pub fn new(maxsize: usize) -> Self {
        let capacity = NonZeroUsize::new(maxsize.max(1)).unwrap();
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
            maxsize: capacity.get(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn get(&self, qname: &str, qtype: &str) -> Option<Vec<Record>> {
        let key = CacheKey {
            qname: qname.to_string(),
            qtype: qtype.to_string(),
        };
        let mut cache = self.inner.lock().unwrap();
        match cache.get(&key) {
            Some(entry) if entry.expires_at > Instant::now() => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(entry.records.clone())
            }
            Some(_) => {
                cache.pop(&key);
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    pub fn put(&self, qname: &str, qtype: &str, records: Vec<Record>, ttl_secs: u32) {
        if ttl_secs == 0 || records.is_empty() {
            return;
        }
        let expires_at = Instant::now() + std::time::Duration::from_secs(u64::from(ttl_secs));
        self.put_with_deadline(qname, qtype, records, expires_at);
    }

    fn put_with_deadline(&self, qname: &str, qtype: &str, records: Vec<Record>, expires_at: Instant) {
        let key = CacheKey {
            qname: qname.to_string(),
            qtype: qtype.to_string(),
        };
        let mut cache = self.inner.lock().unwrap();
        cache.put(key, CachedAnswer { records, expires_at });
    }

    /// Drop everything and reset the counters. Returns evicted count.
    pub fn flush(&self) -> usize {
        let mut cache = self.inner.lock().unwrap();
        let count = cache.len();
        cache.clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        count
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let hit_rate = (hits as f64 / (hits + misses).max(1) as f64 * 1000.0).round() / 10.0;
        CacheStats {
            size: self.len(),
            maxsize: self.maxsize,
            hits,
            misses,
            hit_rate,
        }
    }
}
