use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid domain name: {0}")]
    InvalidDomainName(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid port range: {0}")]
    InvalidPortRange(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Query timeout")]
    QueryTimeout,

    #[error("Upstream failed: {0}")]
    UpstreamFailed(String),

    #[error("TLS error: {0}")]
    TlsError(String),

    #[error("Catalog error: {0}")]
    CatalogError(String),

    #[error("Firewall error: {0}")]
    FirewallError(String),
}

impl From<std::io::Error> for DomainError {
    fn from(e: std::io::Error) -> Self {
        DomainError::IoError(e.to_string())
    }
}
