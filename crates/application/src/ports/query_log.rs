use async_trait::async_trait;
use ionman_dns_domain::{DomainError, QueryEvent, ResolverEvent};

/// Bulk sink for front-proxy query events.
#[async_trait]
pub trait QueryLogRepository: Send + Sync {
    /// Persist the whole batch in one insert. Either the batch lands or
    /// the error surfaces; callers treat failures as droppable.
    async fn log_batch(&self, events: &[QueryEvent]) -> Result<(), DomainError>;
}

/// Bulk sink for resolver events.
#[async_trait]
pub trait ResolverLogRepository: Send + Sync {
    async fn log_batch(&self, events: &[ResolverEvent]) -> Result<(), DomainError>;
}
