use async_trait::async_trait;
use ionman_dns_application::ports::{RuleStoreRepository, StoreSnapshot};
use ionman_dns_domain::{client_key, DomainError, Peer, RuleType};
use sqlx::{Row, SqlitePool};

/// One-logical-read projection of all rule state from SQLite.
pub struct SqliteRuleStoreRepository {
    pool: SqlitePool,
}

impl SqliteRuleStoreRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RuleStoreRepository for SqliteRuleStoreRepository {
    async fn snapshot(&self) -> Result<StoreSnapshot, DomainError> {
        let mut snapshot = StoreSnapshot::default();

        let settings = sqlx::query("SELECT setting_key, setting_value FROM settings")
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        for row in &settings {
            snapshot
                .settings
                .insert(row.get("setting_key"), row.get("setting_value"));
        }

        // Peer-scoped category rules.
        let peer_rows = sqlx::query(
            "SELECT cbr.rule_key, cbr.enabled, wp.allowed_ips \
             FROM client_blocking_rules cbr \
             JOIN wg_peers wp ON wp.id = cbr.target_id \
             WHERE cbr.target_type = 'peer' AND cbr.rule_type = ?",
        )
        .bind(RuleType::Category.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        for row in &peer_rows {
            let ip = client_key(row.get::<&str, _>("allowed_ips")).to_string();
            snapshot
                .peer_categories
                .entry(ip)
                .or_default()
                .insert(row.get("rule_key"), row.get::<bool, _>("enabled"));
        }

        // Group-scoped category rules, flattened through membership.
        // Peer-level rows on the same rule key win.
        let group_rows = sqlx::query(
            "SELECT cbr.rule_key, cbr.enabled, wp.allowed_ips \
             FROM client_blocking_rules cbr \
             JOIN client_group_members cgm ON cgm.group_id = cbr.target_id \
             JOIN wg_peers wp ON wp.id = cgm.peer_id \
             WHERE cbr.target_type = 'group' AND cbr.rule_type = ?",
        )
        .bind(RuleType::Category.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        for row in &group_rows {
            let ip = client_key(row.get::<&str, _>("allowed_ips")).to_string();
            let rules = snapshot.peer_categories.entry(ip).or_default();
            let key: String = row.get("rule_key");
            rules.entry(key).or_insert(row.get::<bool, _>("enabled"));
        }

        // Per-peer domain blocklists. Peer rows shadow group rows on the
        // same domain; only rules still enabled after shadowing block.
        let blocklist_rows = sqlx::query(
            "SELECT cbr.rule_key, cbr.enabled, wp.allowed_ips, cbr.target_type \
             FROM client_blocking_rules cbr \
             JOIN wg_peers wp ON wp.id = cbr.target_id \
             WHERE cbr.target_type = 'peer' AND cbr.rule_type = ? \
             UNION ALL \
             SELECT cbr.rule_key, cbr.enabled, wp.allowed_ips, cbr.target_type \
             FROM client_blocking_rules cbr \
             JOIN client_group_members cgm ON cgm.group_id = cbr.target_id \
             JOIN wg_peers wp ON wp.id = cgm.peer_id \
             WHERE cbr.target_type = 'group' AND cbr.rule_type = ? \
             ORDER BY target_type DESC",
        )
        .bind(RuleType::Blocklist.as_str())
        .bind(RuleType::Blocklist.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        {
            use rustc_hash::FxHashMap;
            let mut flattened: FxHashMap<String, FxHashMap<String, bool>> = FxHashMap::default();
            for row in &blocklist_rows {
                let ip = client_key(row.get::<&str, _>("allowed_ips")).to_string();
                let domain: String = row.get::<String, _>("rule_key").to_lowercase();
                // Rows arrive peer-first; later group rows never overwrite.
                flattened
                    .entry(ip)
                    .or_default()
                    .entry(domain)
                    .or_insert(row.get::<bool, _>("enabled"));
            }
            for (ip, domains) in flattened {
                let set = snapshot.peer_blocklists.entry(ip).or_default();
                for (domain, enabled) in domains {
                    if enabled {
                        set.insert(domain);
                    }
                }
            }
            snapshot.peer_blocklists.retain(|_, set| !set.is_empty());
        }

        // Per-peer game rules (both enabled and disabled; disabled rows
        // are explicit allows that override global blocks).
        let game_rows = sqlx::query("SELECT client_ip, game_key, enabled FROM port_blocking_rules")
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        for row in &game_rows {
            let ip = client_key(row.get::<&str, _>("client_ip")).to_string();
            snapshot
                .peer_games
                .entry(ip)
                .or_default()
                .insert(row.get("game_key"), row.get::<bool, _>("enabled"));
        }

        let whitelist_rows = sqlx::query("SELECT domain FROM whitelist")
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        for row in &whitelist_rows {
            snapshot
                .whitelist
                .insert(row.get::<String, _>("domain").to_lowercase());
        }

        // All known client addresses: tunnel peers plus LAN clients.
        let peer_rows = sqlx::query(
            "SELECT id, name, allowed_ips, public_key, enabled FROM wg_peers",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        for row in &peer_rows {
            let peer = Peer {
                id: row.get("id"),
                name: row.get("name"),
                allowed_ips: row.get("allowed_ips"),
                public_key: row.get("public_key"),
                enabled: row.get::<bool, _>("enabled"),
            };
            snapshot.clients.push(peer.client_key().to_string());
        }
        let lan_ips = sqlx::query("SELECT ip_address FROM lan_clients")
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        for row in &lan_ips {
            snapshot.clients.push(row.get("ip_address"));
        }
        snapshot.clients.sort();
        snapshot.clients.dedup();

        Ok(snapshot)
    }

    async fn seed_game_rules(&self, game_key: &str) -> Result<u64, DomainError> {
        let clients = sqlx::query("SELECT DISTINCT client_ip FROM port_blocking_rules")
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        let mut seeded = 0;
        for row in &clients {
            let client_ip: String = row.get("client_ip");
            let result = sqlx::query(
                "INSERT OR IGNORE INTO port_blocking_rules (client_ip, game_key, enabled) \
                 VALUES (?, ?, 1)",
            )
            .bind(&client_ip)
            .bind(game_key)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
            seeded += result.rows_affected();
        }
        Ok(seeded)
    }
}

fn db_err(e: sqlx::Error) -> DomainError {
    DomainError::DatabaseError(e.to_string())
}
