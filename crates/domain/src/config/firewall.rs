use serde::{Deserialize, Serialize};

/// Port-blocking chain and sync cadence.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FirewallConfig {
    /// Dedicated chain hooked once at the top of the forward path.
    #[serde(default = "default_chain")]
    pub chain: String,

    #[serde(default = "default_sync_interval")]
    pub sync_interval_secs: u64,

    /// Run game auto-detect every N sync cycles. 0 disables it.
    #[serde(default = "default_autodetect_cycles")]
    pub autodetect_cycles: u32,
}

impl Default for FirewallConfig {
    fn default() -> Self {
        Self {
            chain: default_chain(),
            sync_interval_secs: default_sync_interval(),
            autodetect_cycles: default_autodetect_cycles(),
        }
    }
}

fn default_chain() -> String {
    "IONMAN-PORTS".to_string()
}

fn default_sync_interval() -> u64 {
    30
}

fn default_autodetect_cycles() -> u32 {
    10
}
