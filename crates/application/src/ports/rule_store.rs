use async_trait::async_trait;
use ionman_dns_domain::DomainError;
use rustc_hash::{FxHashMap, FxHashSet};

/// Everything the persistent store contributes to a rule snapshot,
/// fetched in one logical read.
///
/// Group-scoped rules are already flattened into the per-peer maps with
/// peer rows shadowing group rows on the same rule key, and every map is
/// keyed by the prefix-stripped tunnel address.
#[derive(Debug, Clone, Default)]
pub struct StoreSnapshot {
    /// All `settings` rows (`block_<category>`, `port_block_<game>`, ...).
    pub settings: FxHashMap<String, String>,

    /// client address → category key → enabled.
    pub peer_categories: FxHashMap<String, FxHashMap<String, bool>>,

    /// client address → blocked domain suffixes (enabled rules only).
    pub peer_blocklists: FxHashMap<String, FxHashSet<String>>,

    /// client address → game key → blocked.
    pub peer_games: FxHashMap<String, FxHashMap<String, bool>>,

    /// Globally whitelisted domains, lowercased.
    pub whitelist: FxHashSet<String>,

    /// All known client addresses: WireGuard peers ∪ LAN clients.
    pub clients: Vec<String>,
}

#[async_trait]
pub trait RuleStoreRepository: Send + Sync {
    /// One logical read of all rule state.
    async fn snapshot(&self) -> Result<StoreSnapshot, DomainError>;

    /// Insert enabled port rules for `game_key` for every client already
    /// present in the port rule table. Returns the number of seeded rows.
    async fn seed_game_rules(&self, game_key: &str) -> Result<u64, DomainError>;
}
