use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,

    /// Capacity of the bounded queue buffering query events before the
    /// background flush task writes them. Overflow drops events.
    #[serde(default = "default_queue_capacity")]
    pub log_queue_capacity: usize,

    /// Maximum rows committed in a single bulk INSERT.
    #[serde(default = "default_max_batch_size")]
    pub log_max_batch_size: usize,

    /// Back-off after a failed bulk insert, in milliseconds. The failed
    /// batch is dropped, not retried.
    #[serde(default = "default_retry_backoff_ms")]
    pub log_retry_backoff_ms: u64,

    /// Seconds the pool will wait for a database lock before returning
    /// `SQLITE_BUSY`.
    #[serde(default = "default_busy_timeout_secs")]
    pub busy_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            log_queue_capacity: default_queue_capacity(),
            log_max_batch_size: default_max_batch_size(),
            log_retry_backoff_ms: default_retry_backoff_ms(),
            busy_timeout_secs: default_busy_timeout_secs(),
        }
    }
}

fn default_db_path() -> String {
    "./ionman-dns.db".to_string()
}

fn default_queue_capacity() -> usize {
    50_000
}

fn default_max_batch_size() -> usize {
    500
}

fn default_retry_backoff_ms() -> u64 {
    1000
}

fn default_busy_timeout_secs() -> u64 {
    30
}
