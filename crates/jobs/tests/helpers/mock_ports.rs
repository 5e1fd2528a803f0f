#![allow(dead_code)]
use async_trait::async_trait;
use ionman_dns_application::ports::{
    CatalogStore, PortRuleSyncPort, RuleEnginePort, RuleStoreRepository, StoreSnapshot,
};
use ionman_dns_domain::{CategoryCatalog, CategoryDef, DomainError, GameCatalog, RuleSnapshot};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Rule store serving a fixed snapshot and counting reads.
pub struct MockRuleStore {
    pub reads: AtomicU64,
}

impl MockRuleStore {
    pub fn new() -> Self {
        Self {
            reads: AtomicU64::new(0),
        }
    }
}

#[async_trait]
impl RuleStoreRepository for MockRuleStore {
    async fn snapshot(&self) -> Result<StoreSnapshot, DomainError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let mut snapshot = StoreSnapshot::default();
        snapshot
            .settings
            .insert("block_social".to_string(), "1".to_string());
        snapshot.clients = vec!["10.0.0.7".to_string()];
        Ok(snapshot)
    }

    async fn seed_game_rules(&self, _game_key: &str) -> Result<u64, DomainError> {
        Ok(0)
    }
}

pub struct MockCatalogStore;

#[async_trait]
impl CatalogStore for MockCatalogStore {
    async fn load_categories(&self) -> Result<CategoryCatalog, DomainError> {
        Ok(CategoryCatalog::new(vec![(
            "social".to_string(),
            CategoryDef {
                label: Some("Social".to_string()),
                domains: vec!["tiktok.com".to_string()],
            },
        )]))
    }

    async fn load_games(&self) -> Result<GameCatalog, DomainError> {
        Ok(GameCatalog::default())
    }

    async fn persist_games(&self, _catalog: &GameCatalog) -> Result<(), DomainError> {
        Ok(())
    }
}

/// Engine that remembers every published snapshot.
pub struct MockEngine {
    pub published: Mutex<Vec<Arc<RuleSnapshot>>>,
}

impl MockEngine {
    pub fn new() -> Self {
        Self {
            published: Mutex::new(Vec::new()),
        }
    }

    pub fn publish_count(&self) -> usize {
        self.published.lock().unwrap().len()
    }
}

impl RuleEnginePort for MockEngine {
    fn publish(&self, snapshot: Arc<RuleSnapshot>) {
        self.published.lock().unwrap().push(snapshot);
    }

    fn snapshot(&self) -> Arc<RuleSnapshot> {
        self.published
            .lock()
            .unwrap()
            .last()
            .cloned()
            .unwrap_or_else(|| Arc::new(RuleSnapshot::empty()))
    }
}

/// Port sync counting cycles.
pub struct MockPortSync {
    pub syncs: AtomicU64,
    pub autodetects: AtomicU64,
}

impl MockPortSync {
    pub fn new() -> Self {
        Self {
            syncs: AtomicU64::new(0),
            autodetects: AtomicU64::new(0),
        }
    }
}

#[async_trait]
impl PortRuleSyncPort for MockPortSync {
    async fn sync(&self) -> Result<usize, DomainError> {
        self.syncs.fetch_add(1, Ordering::SeqCst);
        Ok(0)
    }

    async fn autodetect(&self) -> Result<usize, DomainError> {
        self.autodetects.fetch_add(1, Ordering::SeqCst);
        Ok(0)
    }
}
