use serde::{Deserialize, Serialize};

/// Front proxy: UDP listener plus the forwarding upstream non-blocked
/// queries are relayed to.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProxyConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    #[serde(default = "default_upstream_addr")]
    pub upstream_addr: String,

    #[serde(default = "default_upstream_port")]
    pub upstream_port: u16,

    /// TTL attached to synthesized block answers.
    #[serde(default = "default_block_ttl")]
    pub block_ttl: u32,

    /// Seconds to wait for the forwarding upstream before SERVFAIL.
    #[serde(default = "default_upstream_timeout")]
    pub upstream_timeout_secs: u64,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            listen_port: default_listen_port(),
            upstream_addr: default_upstream_addr(),
            upstream_port: default_upstream_port(),
            block_ttl: default_block_ttl(),
            upstream_timeout_secs: default_upstream_timeout(),
        }
    }
}

fn default_listen_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_listen_port() -> u16 {
    53
}

fn default_upstream_addr() -> String {
    "127.0.0.1".to_string()
}

fn default_upstream_port() -> u16 {
    5300
}

fn default_block_ttl() -> u32 {
    300
}

fn default_upstream_timeout() -> u64 {
    5
}
