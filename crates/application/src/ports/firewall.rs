use async_trait::async_trait;
use ionman_dns_domain::{DomainError, FirewallRule};

/// Target capable of atomically replacing the dedicated drop chain.
///
/// The install protocol each sync cycle is: `ensure_chain`, `flush_chain`,
/// then `append` per compiled rule. Individual append failures are logged
/// by the caller and do not abort the cycle.
#[async_trait]
pub trait FirewallBackend: Send + Sync {
    /// Create the chain if missing and hook it once at the top of the
    /// forward path.
    async fn ensure_chain(&self) -> Result<(), DomainError>;

    async fn flush_chain(&self) -> Result<(), DomainError>;

    async fn append(&self, rule: &FirewallRule) -> Result<(), DomainError>;

    /// Human-readable dump of the current chain, for inspection.
    async fn list_rules(&self) -> Result<String, DomainError>;

    /// Flush, unhook and delete the chain.
    async fn teardown(&self) -> Result<(), DomainError>;
}
