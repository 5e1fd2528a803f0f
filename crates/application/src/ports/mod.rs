pub mod catalog;
pub mod firewall;
pub mod port_sync;
pub mod query_log;
pub mod rule_engine;
pub mod rule_store;

pub use catalog::CatalogStore;
pub use firewall::FirewallBackend;
pub use port_sync::PortRuleSyncPort;
pub use query_log::{QueryLogRepository, ResolverLogRepository};
pub use rule_engine::{ReloadHook, RuleEnginePort};
pub use rule_store::{RuleStoreRepository, StoreSnapshot};
