//! IonMan DNS Application Layer
//!
//! Ports (async traits over infrastructure) and the rule store adapter
//! that projects the persistent store into immutable snapshots.
pub mod ports;
pub mod services;

pub use services::RuleStoreAdapter;
