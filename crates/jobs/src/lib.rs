//! IonMan DNS Background Jobs
pub mod port_sync;
pub mod reload;
pub mod runner;

pub use port_sync::PortSyncJob;
pub use reload::ReloadJob;
pub use runner::JobRunner;
