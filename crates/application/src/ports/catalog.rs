use async_trait::async_trait;
use ionman_dns_domain::{CategoryCatalog, DomainError, GameCatalog};

/// The hot-reloaded JSON catalogs (categories and games).
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn load_categories(&self) -> Result<CategoryCatalog, DomainError>;

    async fn load_games(&self) -> Result<GameCatalog, DomainError>;

    /// Rewrite the game catalog file (used by auto-detect).
    async fn persist_games(&self, catalog: &GameCatalog) -> Result<(), DomainError>;
}
