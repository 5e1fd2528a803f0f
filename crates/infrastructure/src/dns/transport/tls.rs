use super::{DnsTransport, TransportResponse};
use async_trait::async_trait;
use ionman_dns_domain::DomainError;
use rustls::pki_types::ServerName;
use rustls::{ClientConfig, RootCertStore};
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tracing::debug;

/// Shared client config: webpki root anchors, no client auth.
static TLS_CLIENT_CONFIG: LazyLock<Arc<ClientConfig>> = LazyLock::new(|| {
    let mut roots = RootCertStore::empty();
    roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    Arc::new(
        ClientConfig::builder()
            .with_root_certificates(roots)
            .with_no_client_auth(),
    )
});

/// DNS over TLS (RFC 7858): a TCP+TLS session per query with the 2-byte
/// big-endian length prefix on both directions. The certificate is
/// verified against the descriptor's host.
pub struct TlsTransport {
    host: String,
    port: u16,
}

impl TlsTransport {
    pub fn new(host: String, port: u16) -> Self {
        Self { host, port }
    }

    async fn exchange(&self, message_bytes: &[u8]) -> Result<Vec<u8>, DomainError> {
        let server_name = ServerName::try_from(self.host.clone())
            .map_err(|e| DomainError::TlsError(format!("Invalid server name {}: {e}", self.host)))?;

        let tcp = TcpStream::connect((self.host.as_str(), self.port))
            .await
            .map_err(|e| {
                DomainError::UpstreamFailed(format!(
                    "TCP connect to {}:{} failed: {e}",
                    self.host, self.port
                ))
            })?;

        let connector = TlsConnector::from(TLS_CLIENT_CONFIG.clone());
        let mut stream = connector
            .connect(server_name, tcp)
            .await
            .map_err(|e| DomainError::TlsError(format!("TLS handshake with {} failed: {e}", self.host)))?;

        let mut framed = Vec::with_capacity(message_bytes.len() + 2);
        framed.extend_from_slice(&(message_bytes.len() as u16).to_be_bytes());
        framed.extend_from_slice(message_bytes);
        stream.write_all(&framed).await?;

        let mut len_buf = [0u8; 2];
        stream.read_exact(&mut len_buf).await?;
        let response_len = u16::from_be_bytes(len_buf) as usize;

        let mut response = vec![0u8; response_len];
        stream.read_exact(&mut response).await?;

        debug!(server = %self.host, bytes_received = response_len, "DoT response received");
        Ok(response)
    }
}

#[async_trait]
impl DnsTransport for TlsTransport {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError> {
        let bytes = tokio::time::timeout(timeout, self.exchange(message_bytes))
            .await
            .map_err(|_| DomainError::QueryTimeout)??;

        Ok(TransportResponse {
            bytes,
            protocol_used: "TLS",
        })
    }

    fn protocol_name(&self) -> &'static str {
        "TLS"
    }
}
