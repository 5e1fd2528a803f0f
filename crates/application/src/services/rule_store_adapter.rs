use crate::ports::{CatalogStore, RuleStoreRepository};
use ionman_dns_domain::{CategoryCatalog, GameCatalog, RuleSnapshot};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Projects the persistent store and the JSON catalogs into immutable
/// `RuleSnapshot`s.
///
/// Failure policy: a store error returns the last successful snapshot
/// (never an empty one mid-flight); a catalog file error keeps the
/// previous in-memory copy. Only a cold start with nothing loadable
/// yields the empty, all-disabled snapshot.
pub struct RuleStoreAdapter {
    store: Arc<dyn RuleStoreRepository>,
    catalogs: Arc<dyn CatalogStore>,
    categories: RwLock<Arc<CategoryCatalog>>,
    games: RwLock<Arc<GameCatalog>>,
    last_good: RwLock<Arc<RuleSnapshot>>,
    clients: RwLock<Arc<Vec<String>>>,
}

impl RuleStoreAdapter {
    pub fn new(store: Arc<dyn RuleStoreRepository>, catalogs: Arc<dyn CatalogStore>) -> Self {
        Self {
            store,
            catalogs,
            categories: RwLock::new(Arc::new(CategoryCatalog::default())),
            games: RwLock::new(Arc::new(GameCatalog::default())),
            last_good: RwLock::new(Arc::new(RuleSnapshot::empty())),
            clients: RwLock::new(Arc::new(Vec::new())),
        }
    }

    /// Re-read catalogs and store, assemble a fresh snapshot, and remember
    /// it as the new last-good. Returns whatever snapshot is current after
    /// the attempt.
    pub async fn refresh(&self) -> Arc<RuleSnapshot> {
        self.refresh_catalogs().await;

        let store_snapshot = match self.store.snapshot().await {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, "Rule store unreachable; serving last good snapshot");
                return self.current().await;
            }
        };

        let categories = self.categories.read().await.clone();
        let games = self.games.read().await.clone();

        let mut snapshot = RuleSnapshot {
            categories: categories.iter().cloned().collect(),
            game_domains: games
                .iter()
                .map(|(key, game)| (key.to_string(), game.domain_set()))
                .collect(),
            global_categories: Default::default(),
            global_games: Default::default(),
            peer_categories: store_snapshot.peer_categories,
            peer_blocklists: store_snapshot.peer_blocklists,
            peer_games: store_snapshot.peer_games,
            whitelist: store_snapshot.whitelist,
        };

        for category in categories.iter() {
            let enabled = store_snapshot
                .settings
                .get(&format!("block_{}", category.key))
                .map(|v| v == "1")
                .unwrap_or(false);
            snapshot.global_categories.insert(category.key.clone(), enabled);
        }

        for (key, value) in &store_snapshot.settings {
            if let Some(game_key) = key.strip_prefix("port_block_") {
                snapshot.global_games.insert(game_key.to_string(), value == "1");
            }
        }

        let snapshot = Arc::new(snapshot);
        *self.last_good.write().await = snapshot.clone();
        *self.clients.write().await = Arc::new(store_snapshot.clients);

        let global_on: Vec<&str> = snapshot
            .global_categories
            .iter()
            .filter(|(_, on)| **on)
            .map(|(k, _)| k.as_str())
            .collect();
        info!(
            categories = snapshot.categories.len(),
            peers_with_rules = snapshot.peer_categories.len(),
            whitelist = snapshot.whitelist.len(),
            global_blocked = ?global_on,
            "Rule snapshot rebuilt"
        );

        snapshot
    }

    async fn refresh_catalogs(&self) {
        match self.catalogs.load_categories().await {
            Ok(catalog) => {
                info!(
                    categories = catalog.len(),
                    domains = catalog.total_domains(),
                    "Category catalog loaded"
                );
                *self.categories.write().await = Arc::new(catalog);
            }
            Err(e) => warn!(error = %e, "Category catalog unreadable; keeping previous copy"),
        }
        match self.catalogs.load_games().await {
            Ok(catalog) => {
                *self.games.write().await = Arc::new(catalog);
            }
            Err(e) => warn!(error = %e, "Game catalog unreadable; keeping previous copy"),
        }
    }

    /// The last successfully assembled snapshot.
    pub async fn current(&self) -> Arc<RuleSnapshot> {
        self.last_good.read().await.clone()
    }

    pub async fn category_catalog(&self) -> Arc<CategoryCatalog> {
        self.categories.read().await.clone()
    }

    pub async fn game_catalog(&self) -> Arc<GameCatalog> {
        self.games.read().await.clone()
    }

    /// All known client addresses as of the last successful store read.
    pub async fn known_clients(&self) -> Arc<Vec<String>> {
        self.clients.read().await.clone()
    }
}
