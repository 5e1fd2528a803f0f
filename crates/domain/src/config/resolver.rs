use serde::{Deserialize, Serialize};

/// Recursive resolver listener and file paths (TOML section).
///
/// Upstreams, cache sizing and timeouts live in a separate JSON settings
/// file (`config_path`) so the dashboard can rewrite them and the resolver
/// can hot-reload without a restart.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResolverConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    #[serde(default = "default_config_path")]
    pub config_path: String,

    /// Where the periodic status JSON document is written.
    #[serde(default = "default_status_path")]
    pub status_path: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            listen_port: default_listen_port(),
            config_path: default_config_path(),
            status_path: default_status_path(),
        }
    }
}

/// One upstream descriptor. `tls: true` switches the transport to
/// DNS-over-TLS with 2-byte length framing; `host` is also the name the
/// server certificate is verified against.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Upstream {
    pub host: String,

    #[serde(default = "default_upstream_port")]
    pub port: u16,

    #[serde(default)]
    pub tls: bool,

    #[serde(default)]
    pub name: Option<String>,
}

impl Upstream {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.host)
    }
}

/// Hot-reloaded resolver settings (`resolver.json`).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ResolverSettings {
    #[serde(default = "default_upstreams")]
    pub upstreams: Vec<Upstream>,

    #[serde(default = "default_cache_size")]
    pub cache_size: usize,

    #[serde(default = "default_cache_min_ttl")]
    pub cache_min_ttl: u32,

    #[serde(default = "default_cache_max_ttl")]
    pub cache_max_ttl: u32,

    /// Per-upstream-attempt timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_true")]
    pub log_queries: bool,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            upstreams: default_upstreams(),
            cache_size: default_cache_size(),
            cache_min_ttl: default_cache_min_ttl(),
            cache_max_ttl: default_cache_max_ttl(),
            timeout_ms: default_timeout_ms(),
            log_queries: default_true(),
        }
    }
}

fn default_listen_addr() -> String {
    "127.0.0.1".to_string()
}

fn default_listen_port() -> u16 {
    5300
}

fn default_config_path() -> String {
    "config/resolver.json".to_string()
}

fn default_status_path() -> String {
    "/tmp/ionman_resolver_status.json".to_string()
}

fn default_upstream_port() -> u16 {
    53
}

fn default_upstreams() -> Vec<Upstream> {
    vec![
        Upstream {
            host: "1.1.1.1".to_string(),
            port: 53,
            tls: false,
            name: Some("Cloudflare".to_string()),
        },
        Upstream {
            host: "8.8.8.8".to_string(),
            port: 53,
            tls: false,
            name: Some("Google".to_string()),
        },
        Upstream {
            host: "9.9.9.9".to_string(),
            port: 53,
            tls: false,
            name: Some("Quad9".to_string()),
        },
    ]
}

fn default_cache_size() -> usize {
    5000
}

fn default_cache_min_ttl() -> u32 {
    60
}

fn default_cache_max_ttl() -> u32 {
    86400
}

fn default_timeout_ms() -> u64 {
    3000
}

fn default_true() -> bool {
    true
}
