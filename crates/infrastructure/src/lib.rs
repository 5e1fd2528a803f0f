//! IonMan DNS Infrastructure Layer
//!
//! Concrete adapters behind the application ports: SQLite repositories,
//! JSON catalog files, the DNS front proxy and recursive resolver, the
//! batch event logger, and the port-blocking firewall compiler.
pub mod catalog;
pub mod database;
pub mod dns;
pub mod firewall;
pub mod logging;
pub mod repositories;
