use super::reply::{build_block_reply, build_servfail, response_action};
use crate::dns::bind_reuse;
use crate::dns::qname::normalize_qname;
use crate::dns::rule_engine::RuleEngine;
use crate::logging::EventSender;
use hickory_proto::op::Message;
use ionman_dns_domain::config::ProxyConfig;
use ionman_dns_domain::{DomainError, QueryAction, QueryEvent, Verdict};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

const MAX_PACKET_SIZE: usize = 4096;

/// UDP front proxy: classifies each query against the rule engine and
/// either synthesizes a block reply or relays the raw bytes to the
/// forwarding upstream.
///
/// The listener never blocks on upstream I/O; every datagram is handled
/// in its own task.
pub struct FrontProxy {
    socket: Arc<UdpSocket>,
    engine: Arc<RuleEngine>,
    logger: EventSender<QueryEvent>,
    upstream: (String, u16),
    upstream_timeout: Duration,
    block_ttl: u32,
}

impl FrontProxy {
    pub async fn bind(
        config: &ProxyConfig,
        engine: Arc<RuleEngine>,
        logger: EventSender<QueryEvent>,
    ) -> Result<Self, DomainError> {
        let addr: SocketAddr = format!("{}:{}", config.listen_addr, config.listen_port)
            .parse()
            .map_err(|_| {
                DomainError::InvalidAddress(format!(
                    "{}:{}",
                    config.listen_addr, config.listen_port
                ))
            })?;

        let socket = bind_reuse(addr)?;
        info!(listen = %addr, upstream = %format!("{}:{}", config.upstream_addr, config.upstream_port), "Front proxy listening");

        Ok(Self {
            socket: Arc::new(socket),
            engine,
            logger,
            upstream: (config.upstream_addr.clone(), config.upstream_port),
            upstream_timeout: Duration::from_secs(config.upstream_timeout_secs),
            block_ttl: config.block_ttl,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, DomainError> {
        Ok(self.socket.local_addr()?)
    }

    /// Receive loop. Runs until the shutdown token fires.
    pub async fn run(self: Arc<Self>, shutdown: CancellationToken) {
        let mut buf = vec![0u8; MAX_PACKET_SIZE];
        loop {
            let (len, peer) = tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Front proxy shutting down");
                    return;
                }
                result = self.socket.recv_from(&mut buf) => match result {
                    Ok(received) => received,
                    Err(e) => {
                        error!(error = %e, "Front proxy receive failed");
                        continue;
                    }
                },
            };

            let data = buf[..len].to_vec();
            let proxy = self.clone();
            tokio::spawn(async move {
                proxy.handle(data, peer).await;
            });
        }
    }

    async fn handle(&self, data: Vec<u8>, peer: SocketAddr) {
        // Malformed packets are dropped without a reply or a log row.
        let Ok(request) = Message::from_vec(&data) else {
            return;
        };
        let Some(query) = request.queries().first() else {
            return;
        };

        let qname = normalize_qname(&query.name().to_utf8());
        let qtype = query.query_type().to_string();
        let client_ip = peer.ip();

        let verdict = self.engine.classify(&client_ip.to_string(), &qname);
        if let Verdict::Block(category) = verdict {
            debug!(client = %client_ip, domain = %qname, category = %category, "Query blocked");
            match build_block_reply(&request, self.block_ttl) {
                Ok(reply) => {
                    if let Err(e) = self.socket.send_to(&reply, peer).await {
                        warn!(error = %e, "Failed to send block reply");
                    }
                }
                Err(e) => warn!(error = %e, domain = %qname, "Failed to build block reply"),
            }
            self.log(client_ip, &qname, qtype, QueryAction::Blocked);
            return;
        }

        // Not blocked: relay the raw request verbatim.
        match self.forward(&data).await {
            Ok(response) => {
                if let Err(e) = self.socket.send_to(&response, peer).await {
                    warn!(error = %e, "Failed to relay upstream response");
                }
                let action = response_action(&response);
                self.log(client_ip, &qname, qtype, action);
            }
            Err(e) => {
                debug!(error = %e, domain = %qname, "Forwarding upstream failed; answering SERVFAIL");
                if let Ok(reply) = build_servfail(&request) {
                    let _ = self.socket.send_to(&reply, peer).await;
                }
                // The query was served, not blocked by us.
                self.log(client_ip, &qname, qtype, QueryAction::Allowed);
            }
        }
    }

    async fn forward(&self, request_bytes: &[u8]) -> Result<Vec<u8>, DomainError> {
        let socket = UdpSocket::bind("0.0.0.0:0").await?;
        let target = (self.upstream.0.as_str(), self.upstream.1);
        socket.send_to(request_bytes, target).await?;

        let mut buf = vec![0u8; MAX_PACKET_SIZE];
        let (len, _) = tokio::time::timeout(self.upstream_timeout, socket.recv_from(&mut buf))
            .await
            .map_err(|_| DomainError::QueryTimeout)??;
        buf.truncate(len);
        Ok(buf)
    }

    fn log(&self, client_ip: std::net::IpAddr, qname: &str, qtype: String, action: QueryAction) {
        self.logger
            .log(QueryEvent::new(client_ip, Arc::from(qname), qtype, action));
    }
}
