use async_trait::async_trait;
use ionman_dns_application::ports::CatalogStore;
use ionman_dns_domain::{CategoryCatalog, CategoryDef, DomainError, Game, GameCatalog};
use serde_json::{Map, Value};
use std::path::PathBuf;
use tracing::debug;

/// Categories and games as hot-reloaded JSON files.
///
/// Both files are objects keyed by catalog key; serde_json is built with
/// `preserve_order`, so iteration order equals file order, which is the
/// order classification and rule emission depend on.
pub struct FileCatalogStore {
    categories_path: PathBuf,
    games_path: PathBuf,
}

impl FileCatalogStore {
    pub fn new(categories_path: impl Into<PathBuf>, games_path: impl Into<PathBuf>) -> Self {
        Self {
            categories_path: categories_path.into(),
            games_path: games_path.into(),
        }
    }
}

#[async_trait]
impl CatalogStore for FileCatalogStore {
    async fn load_categories(&self) -> Result<CategoryCatalog, DomainError> {
        let raw = tokio::fs::read_to_string(&self.categories_path)
            .await
            .map_err(|e| DomainError::CatalogError(format!(
                "{}: {}",
                self.categories_path.display(),
                e
            )))?;
        let map: Map<String, Value> =
            serde_json::from_str(&raw).map_err(|e| DomainError::CatalogError(e.to_string()))?;

        let mut entries = Vec::with_capacity(map.len());
        for (key, value) in map {
            let def: CategoryDef = serde_json::from_value(value)
                .map_err(|e| DomainError::CatalogError(format!("category '{key}': {e}")))?;
            entries.push((key, def));
        }
        Ok(CategoryCatalog::new(entries))
    }

    async fn load_games(&self) -> Result<GameCatalog, DomainError> {
        let raw = tokio::fs::read_to_string(&self.games_path)
            .await
            .map_err(|e| {
                DomainError::CatalogError(format!("{}: {}", self.games_path.display(), e))
            })?;
        let map: Map<String, Value> =
            serde_json::from_str(&raw).map_err(|e| DomainError::CatalogError(e.to_string()))?;

        let mut games = Vec::with_capacity(map.len());
        for (key, value) in map {
            let game: Game = serde_json::from_value(value)
                .map_err(|e| DomainError::CatalogError(format!("game '{key}': {e}")))?;
            games.push((key, game));
        }
        Ok(GameCatalog::new(games))
    }

    async fn persist_games(&self, catalog: &GameCatalog) -> Result<(), DomainError> {
        let mut map = Map::new();
        for (key, game) in catalog.iter() {
            let value = serde_json::to_value(game)
                .map_err(|e| DomainError::CatalogError(e.to_string()))?;
            map.insert(key.to_string(), value);
        }
        let raw = serde_json::to_string_pretty(&Value::Object(map))
            .map_err(|e| DomainError::CatalogError(e.to_string()))?;

        tokio::fs::write(&self.games_path, raw).await.map_err(|e| {
            DomainError::CatalogError(format!("{}: {}", self.games_path.display(), e))
        })?;
        debug!(path = %self.games_path.display(), games = catalog.len(), "Game catalog written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn store_with(categories: &str, games: &str) -> (TempDir, FileCatalogStore) {
        let dir = TempDir::new().unwrap();
        let cat_path = dir.path().join("categories.json");
        let games_path = dir.path().join("games.json");
        tokio::fs::write(&cat_path, categories).await.unwrap();
        tokio::fs::write(&games_path, games).await.unwrap();
        (dir, FileCatalogStore::new(cat_path, games_path))
    }

    #[tokio::test]
    async fn loads_categories_in_file_order() {
        let (_dir, store) = store_with(
            r#"{
                "social": {"label": "Social", "domains": ["tiktok.com"]},
                "ads": {"label": "Ads", "domains": ["doubleclick.net", "adsrvr.org"]},
                "gaming": {"domains": ["roblox.com"]}
            }"#,
            "{}",
        )
        .await;

        let catalog = store.load_categories().await.unwrap();
        let keys: Vec<&str> = catalog.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, ["social", "ads", "gaming"]);
        assert_eq!(catalog.get("gaming").unwrap().label, "gaming");
        assert_eq!(catalog.total_domains(), 4);
    }

    #[tokio::test]
    async fn loads_games_with_ports_and_server_ips() {
        let (_dir, store) = store_with(
            "{}",
            r#"{
                "minecraft": {
                    "label": "Minecraft",
                    "default_blocked": false,
                    "domains": ["minecraft.net"],
                    "ports": [
                        {"proto": "tcp", "range": "25565"},
                        {"proto": "udp", "range": "19132-19133"}
                    ],
                    "server_ips": ["13.104.0.0/14"]
                }
            }"#,
        )
        .await;

        let catalog = store.load_games().await.unwrap();
        let game = catalog.get("minecraft").unwrap();
        assert_eq!(game.ports.len(), 2);
        assert_eq!(game.ports[1].range.end, 19133);
        assert_eq!(game.server_ips.len(), 1);
        assert!(!game.default_blocked);
    }

    #[tokio::test]
    async fn missing_file_is_an_error_not_a_panic() {
        let dir = TempDir::new().unwrap();
        let store = FileCatalogStore::new(
            dir.path().join("nope.json"),
            dir.path().join("nope2.json"),
        );
        assert!(store.load_categories().await.is_err());
        assert!(store.load_games().await.is_err());
    }

    #[tokio::test]
    async fn persist_round_trips_game_catalog() {
        let (_dir, store) = store_with("{}", "{}").await;
        let mut catalog = GameCatalog::default();
        catalog.push(
            "valheim".to_string(),
            Game {
                label: "Valheim".to_string(),
                default_blocked: true,
                domains: vec!["valheimgame.com".to_string()],
                ports: vec![],
                server_ips: vec![],
                auto_detected: true,
            },
        );

        store.persist_games(&catalog).await.unwrap();
        let reloaded = store.load_games().await.unwrap();

        let game = reloaded.get("valheim").unwrap();
        assert!(game.default_blocked);
        assert!(game.auto_detected);
    }
}
