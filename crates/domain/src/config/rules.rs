use serde::{Deserialize, Serialize};

/// Catalog file locations and the rule reload cadence.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RulesConfig {
    #[serde(default = "default_categories_path")]
    pub categories_path: String,

    #[serde(default = "default_games_path")]
    pub games_path: String,

    /// Seconds between periodic snapshot reloads. SIGHUP forces one early.
    #[serde(default = "default_reload_interval")]
    pub reload_interval_secs: u64,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            categories_path: default_categories_path(),
            games_path: default_games_path(),
            reload_interval_secs: default_reload_interval(),
        }
    }
}

fn default_categories_path() -> String {
    "config/categories.json".to_string()
}

fn default_games_path() -> String {
    "config/games.json".to_string()
}

fn default_reload_interval() -> u64 {
    30
}
