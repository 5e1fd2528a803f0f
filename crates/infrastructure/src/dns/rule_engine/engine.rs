use super::adult::AdultHeuristic;
use super::suffix::domain_matches;
use crate::dns::qname::normalize_qname;
use arc_swap::ArcSwap;
use ionman_dns_domain::{RuleSnapshot, Verdict, ALWAYS_ON_CATEGORIES};
use std::sync::Arc;
use tracing::debug;

/// Classifies queries against the currently published rule snapshot.
///
/// The snapshot is swapped atomically on reload; `classify` is lock-free
/// and observes either the pre- or post-swap view in full, never a mix.
pub struct RuleEngine {
    snapshot: ArcSwap<RuleSnapshot>,
    adult: AdultHeuristic,
}

impl RuleEngine {
    pub fn new() -> Self {
        Self {
            snapshot: ArcSwap::from_pointee(RuleSnapshot::empty()),
            adult: AdultHeuristic::new(),
        }
    }

    /// Atomically replace the active snapshot.
    pub fn publish(&self, snapshot: Arc<RuleSnapshot>) {
        self.snapshot.store(snapshot);
    }

    pub fn snapshot(&self) -> Arc<RuleSnapshot> {
        self.snapshot.load_full()
    }

    /// Decide whether `qname` is blocked for `client`.
    ///
    /// Ordered tests; the first rule that yields a decision wins:
    /// whitelist, game allowance override, per-peer blocklist, categories
    /// in catalog order, adult heuristic.
    pub fn classify(&self, client: &str, qname: &str) -> Verdict {
        let domain = normalize_qname(qname);
        let snap = self.snapshot.load();

        // Whitelist always wins.
        if domain_matches(&domain, &snap.whitelist) {
            return Verdict::Allow;
        }

        // A game explicitly unblocked for this peer (or globally) lets its
        // domains through even when a category would block them. Explicit
        // blocks fall through: DNS blocking stays the categories' call.
        for (game_key, domains) in &snap.game_domains {
            if domain_matches(&domain, domains) {
                if snap.game_rule(client, game_key) == Some(false) {
                    debug!(client, domain = %domain, game = %game_key, "Game allowance override");
                    return Verdict::Allow;
                }
            }
        }

        // Per-peer domain blocklist.
        if let Some(blocked_domains) = snap.peer_blocklists.get(client) {
            if domain_matches(&domain, blocked_domains) {
                return Verdict::Block(Arc::from("blocklist"));
            }
        }

        // Categories, in catalog order.
        let custom = snap.peer_categories.get(client);
        for category in &snap.categories {
            if !domain_matches(&domain, &category.domains) {
                continue;
            }
            if ALWAYS_ON_CATEGORIES.contains(&category.key.as_str()) {
                if global_enabled(&snap, &category.key) {
                    return Verdict::Block(Arc::from(category.key.as_str()));
                }
            } else if let Some(enabled) = custom.and_then(|rules| rules.get(&category.key)) {
                if *enabled {
                    return Verdict::Block(Arc::from(category.key.as_str()));
                }
            } else if global_enabled(&snap, &category.key) {
                return Verdict::Block(Arc::from(category.key.as_str()));
            }
        }

        // Adult heuristic, only when the porn category applies to this peer.
        let porn_enabled = custom
            .and_then(|rules| rules.get("porn").copied())
            .unwrap_or_else(|| global_enabled(&snap, "porn"));
        if porn_enabled && self.adult.matches(&domain) {
            self.memoize_porn_root(&domain);
            return Verdict::Block(Arc::from("porn"));
        }

        Verdict::Allow
    }

    /// Remember a heuristic hit by inserting its registrable root into the
    /// porn category, copy-on-write: clone, insert, re-publish. Lost on the
    /// next reload, which is fine; the heuristic will fire again.
    fn memoize_porn_root(&self, domain: &str) {
        let root = AdultHeuristic::registrable_root(domain);
        self.snapshot.rcu(|current| {
            let mut next = RuleSnapshot::clone(current);
            if let Some(category) = next.categories.iter_mut().find(|c| c.key == "porn") {
                category.domains.insert(root.clone());
            }
            next
        });
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ionman_dns_application::ports::RuleEnginePort for RuleEngine {
    fn publish(&self, snapshot: Arc<RuleSnapshot>) {
        RuleEngine::publish(self, snapshot);
    }

    fn snapshot(&self) -> Arc<RuleSnapshot> {
        RuleEngine::snapshot(self)
    }
}

fn global_enabled(snapshot: &RuleSnapshot, category: &str) -> bool {
    snapshot
        .global_categories
        .get(category)
        .copied()
        .unwrap_or(false)
}
