use super::autodetect::detect_new_games;
use super::compiler::compile_rules;
use ionman_dns_application::ports::{
    CatalogStore, FirewallBackend, PortRuleSyncPort, RuleStoreRepository,
};
use ionman_dns_application::RuleStoreAdapter;
use async_trait::async_trait;
use ionman_dns_domain::{DomainError, GameCatalog};
use std::sync::Arc;
use tracing::{info, warn};

/// One reconciliation cycle over the firewall backend.
///
/// Install protocol per cycle: ensure the chain exists and is hooked,
/// flush it, then append the compiled rules. Individual insert failures
/// are logged and skipped; the next cycle re-synchronizes from scratch.
pub struct PortRuleSync {
    adapter: Arc<RuleStoreAdapter>,
    backend: Arc<dyn FirewallBackend>,
    store: Arc<dyn RuleStoreRepository>,
    catalogs: Arc<dyn CatalogStore>,
}

impl PortRuleSync {
    pub fn new(
        adapter: Arc<RuleStoreAdapter>,
        backend: Arc<dyn FirewallBackend>,
        store: Arc<dyn RuleStoreRepository>,
        catalogs: Arc<dyn CatalogStore>,
    ) -> Self {
        Self {
            adapter,
            backend,
            store,
            catalogs,
        }
    }
}

#[async_trait]
impl PortRuleSyncPort for PortRuleSync {
    async fn sync(&self) -> Result<usize, DomainError> {
        let games = self.adapter.game_catalog().await;
        let snapshot = self.adapter.current().await;
        let clients = self.adapter.known_clients().await;

        self.backend.ensure_chain().await?;
        self.backend.flush_chain().await?;

        let rules = compile_rules(&games, &snapshot, &clients);
        let mut installed = 0;
        for rule in &rules {
            match self.backend.append(rule).await {
                Ok(()) => installed += 1,
                Err(e) => warn!(rule = %rule, error = %e, "Rule install failed; continuing"),
            }
        }

        info!(
            rules = rules.len(),
            installed,
            clients = clients.len(),
            "Port rules synced"
        );
        Ok(installed)
    }

    async fn autodetect(&self) -> Result<usize, DomainError> {
        let categories = self.adapter.category_catalog().await;
        let games = self.adapter.game_catalog().await;

        let detected = detect_new_games(&categories, &games);
        if detected.is_empty() {
            return Ok(0);
        }

        let mut next = GameCatalog::clone(&games);
        for (key, game) in &detected {
            next.push(key.clone(), game.clone());
        }
        self.catalogs.persist_games(&next).await?;

        for (key, _) in &detected {
            match self.store.seed_game_rules(key).await {
                Ok(seeded) => info!(game = %key, seeded, "Seeded rules for detected game"),
                Err(e) => warn!(game = %key, error = %e, "Seeding rules failed"),
            }
        }
        Ok(detected.len())
    }
}
