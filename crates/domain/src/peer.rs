/// A WireGuard peer as projected from the persistent store.
///
/// `allowed_ips` is the tunnel address with prefix length (e.g. `10.0.0.7/32`).
/// The prefix-stripped form is the unique key every rule map is indexed by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Peer {
    pub id: i64,
    pub name: String,
    pub allowed_ips: String,
    pub public_key: Option<String>,
    pub enabled: bool,
}

impl Peer {
    /// The client lookup key: tunnel address without the prefix length.
    pub fn client_key(&self) -> &str {
        client_key(&self.allowed_ips)
    }
}

/// Strip a `/len` prefix from a tunnel address, if present.
pub fn client_key(allowed_ips: &str) -> &str {
    allowed_ips
        .split_once('/')
        .map(|(addr, _)| addr)
        .unwrap_or(allowed_ips)
}
