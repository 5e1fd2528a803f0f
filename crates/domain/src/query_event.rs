use chrono::{DateTime, Utc};
use std::net::IpAddr;
use std::sync::Arc;

/// What happened to a query, as recorded in the logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryAction {
    Allowed,
    Blocked,
    Cached,
    Nxdomain,
    Error,
}

impl QueryAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryAction::Allowed => "allowed",
            QueryAction::Blocked => "blocked",
            QueryAction::Cached => "cached",
            QueryAction::Nxdomain => "nxdomain",
            QueryAction::Error => "error",
        }
    }
}

/// One front-proxy query event bound for the `query_log` table.
#[derive(Debug, Clone)]
pub struct QueryEvent {
    pub client_ip: IpAddr,
    /// Lowercased, trailing dot stripped.
    pub domain: Arc<str>,
    pub query_type: String,
    pub action: QueryAction,
    pub logged_at: DateTime<Utc>,
}

impl QueryEvent {
    pub fn new(client_ip: IpAddr, domain: Arc<str>, query_type: String, action: QueryAction) -> Self {
        Self {
            client_ip,
            domain,
            query_type,
            action,
            logged_at: Utc::now(),
        }
    }
}

/// One resolver event bound for the `resolver_log` table.
#[derive(Debug, Clone)]
pub struct ResolverEvent {
    pub qname: Arc<str>,
    pub qtype: String,
    pub client_ip: IpAddr,
    pub status: QueryAction,
    pub cached: bool,
    /// Upstream round-trip in milliseconds; 0 for cache hits and failures.
    pub upstream_ms: f64,
    pub logged_at: DateTime<Utc>,
}

impl ResolverEvent {
    pub fn new(
        qname: Arc<str>,
        qtype: String,
        client_ip: IpAddr,
        status: QueryAction,
        cached: bool,
        upstream_ms: f64,
    ) -> Self {
        Self {
            qname,
            qtype,
            client_ip,
            status,
            cached,
            upstream_ms,
            logged_at: Utc::now(),
        }
    }
}
