//! IonMan DNS Domain Layer
pub mod category;
pub mod config;
pub mod errors;
pub mod firewall;
pub mod game;
pub mod peer;
pub mod query_event;
pub mod rules;

pub use category::{Category, CategoryCatalog, CategoryDef};
pub use config::{CliOverrides, Config, ConfigError};
pub use errors::DomainError;
pub use firewall::{FirewallRule, RuleTarget};
pub use game::{Game, GameCatalog, GamePort, PortRange, Protocol};
pub use peer::{client_key, Peer};
pub use query_event::{QueryAction, QueryEvent, ResolverEvent};
pub use rules::{RuleSnapshot, RuleType, Verdict, ALWAYS_ON_CATEGORIES};
