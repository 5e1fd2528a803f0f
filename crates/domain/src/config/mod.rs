//! Configuration for IonMan DNS
//!
//! - `root`: top-level `Config`, file loading, env and CLI overrides
//! - `proxy`: front proxy listener and forwarding upstream
//! - `resolver`: recursive resolver listener plus the hot-reloaded
//!   `resolver.json` settings
//! - `rules`: catalog file paths and the reload cadence
//! - `firewall`: port-blocking chain and sync cadence
//! - `database`: SQLite path and query-log batching knobs
//! - `logging`: log level

pub mod database;
pub mod errors;
pub mod firewall;
pub mod logging;
pub mod proxy;
pub mod resolver;
pub mod root;
pub mod rules;

pub use database::DatabaseConfig;
pub use errors::ConfigError;
pub use firewall::FirewallConfig;
pub use logging::LoggingConfig;
pub use proxy::ProxyConfig;
pub use resolver::{ResolverConfig, ResolverSettings, Upstream};
pub use root::{CliOverrides, Config};
pub use rules::RulesConfig;
