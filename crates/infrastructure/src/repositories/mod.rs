pub mod query_log_repository;
pub mod resolver_log_repository;
pub mod rule_store_repository;

pub use query_log_repository::SqliteQueryLogRepository;
pub use resolver_log_repository::SqliteResolverLogRepository;
pub use rule_store_repository::SqliteRuleStoreRepository;
