pub mod autodetect;
pub mod compiler;
pub mod iptables;
pub mod sync;

pub use autodetect::detect_new_games;
pub use compiler::compile_rules;
pub use iptables::IptablesBackend;
pub use sync::PortRuleSync;
