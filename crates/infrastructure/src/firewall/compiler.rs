//! Port-blocking rule compilation.
//!
//! Turns the per-peer game rule set into a deterministic, deduplicated
//! list of drop rules. Determinism contract: clients sorted by address,
//! port rules before destination rules, owning-game order as the catalog
//! defines it. Identical input snapshots compile to identical output.

use ionman_dns_domain::{FirewallRule, GameCatalog, PortRange, Protocol, RuleSnapshot, RuleTarget};
use rustc_hash::FxHashSet;

/// Compile the drop rules for every known client.
///
/// Effective decision per (client, game): peer rule, else global setting,
/// else the game's `default_blocked` flag.
///
/// Port-overlap safety: a `(proto, range)` is only dropped for a client
/// if every game owning an overlapping same-proto range is blocked for
/// that client; otherwise the port stays open so the allowed game keeps
/// working. Destination networks are per-game and skip overlap
/// resolution entirely.
pub fn compile_rules(
    games: &GameCatalog,
    snapshot: &RuleSnapshot,
    clients: &[String],
) -> Vec<FirewallRule> {
    // (proto, range) → owning game keys, both in catalog order.
    let mut port_owners: Vec<((Protocol, PortRange), Vec<&str>)> = Vec::new();
    for (game_key, game) in games.iter() {
        for port in &game.ports {
            let entry = (port.proto, port.range);
            match port_owners.iter_mut().find(|(key, _)| *key == entry) {
                Some((_, owners)) => owners.push(game_key),
                None => port_owners.push((entry, vec![game_key])),
            }
        }
    }

    let mut sorted_clients: Vec<&String> = clients.iter().collect();
    sorted_clients.sort();
    sorted_clients.dedup();

    let mut rules = Vec::new();
    for client in sorted_clients {
        let blocked: FxHashSet<&str> = games
            .iter()
            .filter(|(game_key, game)| {
                snapshot
                    .game_rule(client, game_key)
                    .unwrap_or(game.default_blocked)
            })
            .map(|(game_key, _)| game_key)
            .collect();
        if blocked.is_empty() {
            continue;
        }

        // Port rules, deduplicated per (client, proto, range).
        let mut seen: FxHashSet<(Protocol, PortRange)> = FxHashSet::default();
        for ((proto, range), owners) in &port_owners {
            let all_owners_blocked = port_owners
                .iter()
                .filter(|((other_proto, other_range), _)| {
                    *other_proto == *proto && other_range.overlaps(range)
                })
                .all(|(_, other_owners)| other_owners.iter().all(|g| blocked.contains(g)));
            if !all_owners_blocked {
                continue;
            }
            if !seen.insert((*proto, *range)) {
                continue;
            }
            rules.push(FirewallRule {
                client: client.clone(),
                game: owners[0].to_string(),
                target: RuleTarget::Port {
                    proto: *proto,
                    range: *range,
                },
            });
        }

        // Destination rules, per blocked game in catalog order.
        for (game_key, game) in games.iter() {
            if !blocked.contains(game_key) {
                continue;
            }
            for network in &game.server_ips {
                rules.push(FirewallRule {
                    client: client.clone(),
                    game: game_key.to_string(),
                    target: RuleTarget::Dest(*network),
                });
            }
        }
    }

    rules
}
