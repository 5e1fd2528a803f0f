use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::Arc;

use crate::category::Category;

/// Categories enforced for every peer whenever the global flag is on.
/// Per-peer and group rules cannot relax these.
pub const ALWAYS_ON_CATEGORIES: &[&str] = &["ads"];

/// Kind of an admin-managed blocking rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleType {
    Category,
    Blocklist,
}

impl RuleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleType::Category => "category",
            RuleType::Blocklist => "blocklist",
        }
    }
}

/// Outcome of classifying one query against the active snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Allow,
    /// Blocked, tagged with the category key (or `"blocklist"` for
    /// per-peer domain rules).
    Block(Arc<str>),
}

impl Verdict {
    pub fn is_blocked(&self) -> bool {
        matches!(self, Verdict::Block(_))
    }

    pub fn category(&self) -> Option<&str> {
        match self {
            Verdict::Allow => None,
            Verdict::Block(cat) => Some(cat),
        }
    }
}

/// Immutable projection of every rule the classify path consults.
///
/// Built in one logical read by the rule store adapter and published
/// atomically; readers hold an `Arc` and never see a partial update.
/// Group-level rules are already flattened into the per-peer maps, with
/// peer-level rows shadowing group rows on the same rule key.
#[derive(Debug, Clone, Default)]
pub struct RuleSnapshot {
    /// Categories in catalog file order. First suffix match wins.
    pub categories: Vec<Category>,

    /// Game key → lowercased domain set, in catalog order.
    pub game_domains: Vec<(String, FxHashSet<String>)>,

    /// `block_<category>` settings.
    pub global_categories: FxHashMap<String, bool>,

    /// `port_block_<game>` settings.
    pub global_games: FxHashMap<String, bool>,

    /// client address → category key → enabled.
    pub peer_categories: FxHashMap<String, FxHashMap<String, bool>>,

    /// client address → blocked domain suffixes.
    pub peer_blocklists: FxHashMap<String, FxHashSet<String>>,

    /// client address → game key → blocked.
    pub peer_games: FxHashMap<String, FxHashMap<String, bool>>,

    /// Globally whitelisted domains. A match suppresses all blocking.
    pub whitelist: FxHashSet<String>,
}

impl RuleSnapshot {
    /// Cold-start snapshot: nothing is known, nothing is blocked.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Effective game-block decision for `(client, game)`: peer rule if
    /// present, else global setting. `None` means no explicit rule exists.
    pub fn game_rule(&self, client: &str, game: &str) -> Option<bool> {
        if let Some(rules) = self.peer_games.get(client) {
            if let Some(blocked) = rules.get(game) {
                return Some(*blocked);
            }
        }
        self.global_games.get(game).copied()
    }
}
