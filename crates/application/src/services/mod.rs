pub mod rule_store_adapter;

pub use rule_store_adapter::RuleStoreAdapter;
