use async_trait::async_trait;
use ionman_dns_domain::DomainError;

/// One port-blocking reconciliation cycle, as the scheduler sees it.
#[async_trait]
pub trait PortRuleSyncPort: Send + Sync {
    /// Rebuild the firewall chain from the current rule state. Returns the
    /// number of rules installed.
    async fn sync(&self) -> Result<usize, DomainError>;

    /// Detect and persist new games from the gaming category. Returns the
    /// number of games added.
    async fn autodetect(&self) -> Result<usize, DomainError>;
}
