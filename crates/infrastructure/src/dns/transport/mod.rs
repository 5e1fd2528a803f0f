pub mod tls;
pub mod udp;

use async_trait::async_trait;
use ionman_dns_domain::config::Upstream;
use ionman_dns_domain::DomainError;
use std::time::Duration;

/// Result of a raw DNS transport exchange.
#[derive(Debug)]
pub struct TransportResponse {
    /// Raw DNS response bytes (wire format).
    pub bytes: Vec<u8>,
    pub protocol_used: &'static str,
}

/// Trait for sending raw DNS messages over the wire.
#[async_trait]
pub trait DnsTransport: Send + Sync {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError>;

    fn protocol_name(&self) -> &'static str;
}

/// Enum-dispatched transport: stack-allocated, no per-query boxing.
pub enum Transport {
    Udp(udp::UdpTransport),
    Tls(tls::TlsTransport),
}

impl Transport {
    pub async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError> {
        match self {
            Self::Udp(t) => DnsTransport::send(t, message_bytes, timeout).await,
            Self::Tls(t) => DnsTransport::send(t, message_bytes, timeout).await,
        }
    }

    pub fn protocol_name(&self) -> &'static str {
        match self {
            Self::Udp(_) => "UDP",
            Self::Tls(_) => "TLS",
        }
    }
}

/// Build the transport an upstream descriptor asks for.
pub fn create_transport(upstream: &Upstream) -> Transport {
    if upstream.tls {
        Transport::Tls(tls::TlsTransport::new(
            upstream.host.clone(),
            upstream.port,
        ))
    } else {
        Transport::Udp(udp::UdpTransport::new(
            upstream.host.clone(),
            upstream.port,
        ))
    }
}
