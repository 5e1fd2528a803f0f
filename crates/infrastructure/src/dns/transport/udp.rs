use super::{DnsTransport, TransportResponse};
use async_trait::async_trait;
use ionman_dns_domain::DomainError;
use std::time::Duration;
use tokio::net::UdpSocket;
use tracing::debug;

/// Maximum UDP DNS response size with EDNS(0).
const MAX_UDP_RESPONSE_SIZE: usize = 4096;

/// Plain DNS over UDP. A fresh ephemeral socket per query keeps
/// transaction state isolated between concurrent packet tasks.
pub struct UdpTransport {
    host: String,
    port: u16,
}

impl UdpTransport {
    pub fn new(host: String, port: u16) -> Self {
        Self { host, port }
    }
}

#[async_trait]
impl DnsTransport for UdpTransport {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError> {
        let socket = UdpSocket::bind("0.0.0.0:0").await.map_err(|e| {
            DomainError::UpstreamFailed(format!("Failed to bind UDP socket: {e}"))
        })?;

        let target = (self.host.as_str(), self.port);
        tokio::time::timeout(timeout, socket.send_to(message_bytes, target))
            .await
            .map_err(|_| DomainError::QueryTimeout)?
            .map_err(|e| {
                DomainError::UpstreamFailed(format!(
                    "Failed to send UDP query to {}:{}: {e}",
                    self.host, self.port
                ))
            })?;

        let mut recv_buf = vec![0u8; MAX_UDP_RESPONSE_SIZE];
        let (bytes_received, _) = tokio::time::timeout(timeout, socket.recv_from(&mut recv_buf))
            .await
            .map_err(|_| DomainError::QueryTimeout)?
            .map_err(|e| {
                DomainError::UpstreamFailed(format!(
                    "Failed to receive UDP response from {}:{}: {e}",
                    self.host, self.port
                ))
            })?;

        recv_buf.truncate(bytes_received);
        debug!(
            server = %self.host,
            port = self.port,
            bytes_received,
            "UDP response received"
        );

        Ok(TransportResponse {
            bytes: recv_buf,
            protocol_used: "UDP",
        })
    }

    fn protocol_name(&self) -> &'static str {
        "UDP"
    }
}
