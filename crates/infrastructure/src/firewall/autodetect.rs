use ionman_dns_domain::{CategoryCatalog, Game, GameCatalog};
use rustc_hash::FxHashMap;
use tracing::info;

/// Labels too generic to name a game after.
const GENERIC_LABELS: &[&str] = &["www", "store", "accounts", "api", "web", "m", "cdn"];

/// Scan the gaming category for domains no game definition covers yet and
/// group them by registrable root into new dns-only game entries
/// (`default_blocked = true`, no ports). The caller persists the entries
/// and seeds rules for existing clients.
pub fn detect_new_games(
    categories: &CategoryCatalog,
    games: &GameCatalog,
) -> Vec<(String, Game)> {
    let Some(gaming) = categories.get("gaming") else {
        return Vec::new();
    };

    // Everything already covered: each game domain plus its root.
    let mut covered: Vec<String> = Vec::new();
    for (_, game) in games.iter() {
        for domain in &game.domains {
            let domain = domain.to_lowercase();
            covered.push(registrable_root(&domain));
            covered.push(domain);
        }
    }

    // Group uncovered gaming domains by root, preserving category order.
    let mut groups: Vec<(String, Vec<String>)> = Vec::new();
    let mut sorted_domains: Vec<&String> = gaming.domains.iter().collect();
    sorted_domains.sort();
    for domain in sorted_domains {
        let domain = domain.to_lowercase();
        let root = registrable_root(&domain);
        let is_covered = covered.iter().any(|gd| {
            domain == *gd || domain.ends_with(&format!(".{gd}")) || root == *gd
        });
        if is_covered {
            continue;
        }
        match groups.iter_mut().find(|(r, _)| *r == root) {
            Some((_, domains)) => domains.push(domain),
            None => groups.push((root, vec![domain])),
        }
    }

    let mut detected = Vec::new();
    for (root, domains) in groups {
        let key = root.replace(['.', '-'], "_");
        if games.contains(&key) {
            continue;
        }
        let game = Game {
            label: guess_label(&key, &domains),
            default_blocked: true,
            domains: domains.clone(),
            ports: vec![],
            server_ips: vec![],
            auto_detected: true,
        };
        info!(game = %key, domains = ?domains, "Auto-detected new game");
        detected.push((key, game));
    }
    detected
}

/// The last two labels of a domain.
fn registrable_root(domain: &str) -> String {
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() >= 2 {
        labels[labels.len() - 2..].join(".")
    } else {
        domain.to_string()
    }
}

/// Pick a display label from the first non-generic leading label, falling
/// back to the sanitized key.
fn guess_label(key: &str, domains: &[String]) -> String {
    for domain in domains {
        let label = match domain.strip_prefix("www.") {
            Some(rest) => rest.split('.').next(),
            None => domain.split('.').next(),
        };
        if let Some(label) = label {
            if !GENERIC_LABELS.contains(&label) {
                return title_case(&label.replace('-', " "));
            }
        }
    }
    title_case(&key.replace('_', " "))
}

fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use ionman_dns_domain::CategoryDef;

    fn categories(gaming_domains: &[&str]) -> CategoryCatalog {
        CategoryCatalog::new(vec![(
            "gaming".to_string(),
            CategoryDef {
                label: Some("Gaming".to_string()),
                domains: gaming_domains.iter().map(|d| d.to_string()).collect(),
            },
        )])
    }

    fn catalog_with_minecraft() -> GameCatalog {
        let mut games = GameCatalog::default();
        games.push(
            "minecraft".to_string(),
            Game {
                label: "Minecraft".to_string(),
                default_blocked: false,
                domains: vec!["minecraft.net".to_string()],
                ports: vec![],
                server_ips: vec![],
                auto_detected: false,
            },
        );
        games
    }

    #[test]
    fn covered_domains_are_not_redetected() {
        let cats = categories(&["minecraft.net", "session.minecraft.net"]);
        let games = catalog_with_minecraft();
        assert!(detect_new_games(&cats, &games).is_empty());
    }

    #[test]
    fn uncovered_domains_group_by_root() {
        let cats = categories(&[
            "roblox.com",
            "www.roblox.com",
            "rbxcdn.com",
            "minecraft.net",
        ]);
        let games = catalog_with_minecraft();

        let detected = detect_new_games(&cats, &games);

        let keys: Vec<&str> = detected.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["rbxcdn_com", "roblox_com"]);
        let (_, roblox) = detected.iter().find(|(k, _)| k == "roblox_com").unwrap();
        assert_eq!(roblox.domains, ["roblox.com", "www.roblox.com"]);
        assert!(roblox.default_blocked);
        assert!(roblox.auto_detected);
        assert!(roblox.ports.is_empty());
    }

    #[test]
    fn label_skips_generic_prefixes() {
        let cats = categories(&["www.epicgames.com", "store.epicgames.com"]);
        let games = GameCatalog::default();

        let detected = detect_new_games(&cats, &games);

        assert_eq!(detected.len(), 1);
        assert_eq!(detected[0].1.label, "Epicgames");
    }

    #[test]
    fn missing_gaming_category_detects_nothing() {
        let cats = CategoryCatalog::default();
        let games = GameCatalog::default();
        assert!(detect_new_games(&cats, &games).is_empty());
    }
}
