use super::{
    ConfigError, DatabaseConfig, FirewallConfig, LoggingConfig, ProxyConfig, ResolverConfig,
    RulesConfig,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::net::IpAddr;
use std::path::Path;

/// Top-level configuration, assembled from (in increasing precedence):
/// built-in defaults, the TOML config file, `IONMAN_*` environment
/// variables, and CLI flags.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub proxy: ProxyConfig,

    #[serde(default)]
    pub resolver: ResolverConfig,

    #[serde(default)]
    pub rules: RulesConfig,

    #[serde(default)]
    pub firewall: FirewallConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Overrides passed on the command line. `None` means "not given".
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub listen_addr: Option<String>,
    pub listen_port: Option<u16>,
    pub resolver_port: Option<u16>,
    pub db_path: Option<String>,
}

impl Config {
    pub fn load(path: Option<&str>, overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) if Path::new(p).exists() => {
                let raw = std::fs::read_to_string(p)?;
                toml::from_str(&raw).map_err(|e| ConfigError::Parse(e.to_string()))?
            }
            _ => Config::default(),
        };

        config.apply_env();
        config.apply_overrides(overrides);
        Ok(config)
    }

    /// Apply `IONMAN_*` environment variables. Unparseable values are
    /// ignored in favour of the current setting.
    fn apply_env(&mut self) {
        if let Ok(v) = env::var("IONMAN_DNS_LISTEN") {
            self.proxy.listen_addr = v;
        }
        if let Some(v) = env_parse("IONMAN_DNS_PORT") {
            self.proxy.listen_port = v;
        }
        if let Ok(v) = env::var("IONMAN_UPSTREAM_ADDR") {
            self.proxy.upstream_addr = v;
        }
        if let Some(v) = env_parse("IONMAN_UPSTREAM_PORT") {
            self.proxy.upstream_port = v;
        }
        if let Some(v) = env_parse("IONMAN_BLOCK_TTL") {
            self.proxy.block_ttl = v;
        }
        if let Ok(v) = env::var("IONMAN_RESOLVER_ADDR") {
            self.resolver.listen_addr = v;
        }
        if let Some(v) = env_parse("IONMAN_RESOLVER_PORT") {
            self.resolver.listen_port = v;
        }
        if let Ok(v) = env::var("IONMAN_RESOLVER_CONFIG") {
            self.resolver.config_path = v;
        }
        if let Ok(v) = env::var("IONMAN_STATUS_FILE") {
            self.resolver.status_path = v;
        }
        if let Ok(v) = env::var("IONMAN_CATEGORIES") {
            self.rules.categories_path = v;
        }
        if let Ok(v) = env::var("IONMAN_GAMES") {
            self.rules.games_path = v;
        }
        if let Some(v) = env_parse("IONMAN_RELOAD_INTERVAL") {
            self.rules.reload_interval_secs = v;
        }
        if let Ok(v) = env::var("IONMAN_DB_PATH") {
            self.database.path = v;
        }
        if let Ok(v) = env::var("IONMAN_LOG_LEVEL") {
            self.logging.level = v;
        }
    }

    fn apply_overrides(&mut self, overrides: CliOverrides) {
        if let Some(addr) = overrides.listen_addr {
            self.proxy.listen_addr = addr;
        }
        if let Some(port) = overrides.listen_port {
            self.proxy.listen_port = port;
        }
        if let Some(port) = overrides.resolver_port {
            self.resolver.listen_port = port;
        }
        if let Some(path) = overrides.db_path {
            self.database.path = path;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.proxy
            .listen_addr
            .parse::<IpAddr>()
            .map_err(|_| invalid("proxy.listen_addr", &self.proxy.listen_addr))?;
        self.resolver
            .listen_addr
            .parse::<IpAddr>()
            .map_err(|_| invalid("resolver.listen_addr", &self.resolver.listen_addr))?;
        if self.proxy.block_ttl == 0 {
            return Err(ConfigError::Invalid("proxy.block_ttl must be > 0".into()));
        }
        if self.rules.reload_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "rules.reload_interval_secs must be > 0".into(),
            ));
        }
        if self.database.log_max_batch_size == 0 {
            return Err(ConfigError::Invalid(
                "database.log_max_batch_size must be > 0".into(),
            ));
        }
        if self.firewall.chain.is_empty() {
            return Err(ConfigError::Invalid("firewall.chain must not be empty".into()));
        }
        Ok(())
    }
}

fn invalid(field: &str, value: &str) -> ConfigError {
    ConfigError::Invalid(format!("{field}: not an IP address: {value}"))
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.proxy.listen_port, 53);
        assert_eq!(config.proxy.block_ttl, 300);
        assert_eq!(config.rules.reload_interval_secs, 30);
        assert_eq!(config.firewall.chain, "IONMAN-PORTS");
    }

    #[test]
    fn section_defaults_fill_missing_toml_fields() {
        let config: Config = toml::from_str(
            r#"
            [proxy]
            listen_port = 1053

            [resolver]
            listen_port = 15300
            "#,
        )
        .unwrap();
        assert_eq!(config.proxy.listen_port, 1053);
        assert_eq!(config.proxy.upstream_port, 5300);
        assert_eq!(config.resolver.listen_port, 15300);
        assert_eq!(config.database.log_queue_capacity, 50_000);
    }

    #[test]
    fn rejects_bad_listen_addr() {
        let mut config = Config::default();
        config.proxy.listen_addr = "not-an-ip".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn cli_overrides_win() {
        let mut config = Config::default();
        config.apply_overrides(CliOverrides {
            listen_addr: Some("127.0.0.1".into()),
            listen_port: Some(10053),
            resolver_port: None,
            db_path: Some("/tmp/test.db".into()),
        });
        assert_eq!(config.proxy.listen_addr, "127.0.0.1");
        assert_eq!(config.proxy.listen_port, 10053);
        assert_eq!(config.database.path, "/tmp/test.db");
    }
}
