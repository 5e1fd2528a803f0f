use super::cache::DnsCache;
use super::stats::{ResolverStats, StatusDocument};
use super::upstream::UpstreamPool;
use crate::dns::bind_reuse;
use crate::dns::proxy::reply::{build_servfail, serialize};
use crate::dns::qname::normalize_qname;
use crate::logging::EventSender;
use arc_swap::ArcSwap;
use hickory_proto::op::{Message, MessageType, OpCode, ResponseCode};
use ionman_dns_domain::config::{ResolverConfig, ResolverSettings};
use ionman_dns_domain::{DomainError, QueryAction, ResolverEvent};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

const MAX_PACKET_SIZE: usize = 4096;

/// Caching recursive resolver: an independent UDP listener that answers
/// from the LRU cache or forwards to the configured upstreams.
pub struct RecursiveResolver {
    socket: Arc<UdpSocket>,
    listen: SocketAddr,
    cache: DnsCache,
    stats: ResolverStats,
    upstreams: UpstreamPool,
    settings: ArcSwap<ResolverSettings>,
    settings_path: PathBuf,
    logger: EventSender<ResolverEvent>,
}

impl RecursiveResolver {
    pub async fn bind(
        config: &ResolverConfig,
        logger: EventSender<ResolverEvent>,
    ) -> Result<Self, DomainError> {
        let addr: SocketAddr = format!("{}:{}", config.listen_addr, config.listen_port)
            .parse()
            .map_err(|_| {
                DomainError::InvalidAddress(format!(
                    "{}:{}",
                    config.listen_addr, config.listen_port
                ))
            })?;

        let settings = load_settings(&config.config_path).await;
        let socket = bind_reuse(addr)?;
        let listen = socket.local_addr()?;

        info!(listen = %listen, cache_size = settings.cache_size, "Resolver listening");
        for upstream in &settings.upstreams {
            info!(
                upstream = upstream.display_name(),
                host = %upstream.host,
                port = upstream.port,
                tls = upstream.tls,
                "Resolver upstream"
            );
        }

        Ok(Self {
            socket: Arc::new(socket),
            listen,
            cache: DnsCache::new(settings.cache_size),
            stats: ResolverStats::new(),
            upstreams: UpstreamPool::new(),
            settings: ArcSwap::from_pointee(settings),
            settings_path: PathBuf::from(&config.config_path),
            logger,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.listen
    }

    /// Re-read `resolver.json`. A missing or unparseable file keeps the
    /// settings already in effect.
    pub async fn reload_settings(&self) {
        match read_settings(&self.settings_path).await {
            Ok(settings) => {
                if *self.settings.load_full() != settings {
                    info!(path = %self.settings_path.display(), "Resolver settings reloaded");
                    self.settings.store(Arc::new(settings));
                }
            }
            Err(e) => warn!(error = %e, "Resolver settings unreadable; keeping previous copy"),
        }
    }

    /// Snapshot for the status sink.
    pub fn status_document(&self) -> StatusDocument {
        let settings = self.settings.load_full();
        self.stats.snapshot(
            self.listen.to_string(),
            self.cache.stats(),
            ResolverSettings::clone(&settings),
        )
    }

    /// Receive loop. Runs until the shutdown token fires.
    pub async fn run(self: Arc<Self>, shutdown: CancellationToken) {
        let mut buf = vec![0u8; MAX_PACKET_SIZE];
        loop {
            let (len, peer) = tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Resolver shutting down");
                    return;
                }
                result = self.socket.recv_from(&mut buf) => match result {
                    Ok(received) => received,
                    Err(e) => {
                        error!(error = %e, "Resolver receive failed");
                        continue;
                    }
                },
            };

            let data = buf[..len].to_vec();
            let resolver = self.clone();
            tokio::spawn(async move {
                if let Some(reply) = resolver.handle_query(&data, peer).await {
                    if let Err(e) = resolver.socket.send_to(&reply, peer).await {
                        warn!(error = %e, "Failed to send resolver reply");
                    }
                }
            });
        }
    }

    /// Process one query; `None` means drop (malformed input).
    async fn handle_query(&self, data: &[u8], peer: SocketAddr) -> Option<Vec<u8>> {
        let request = Message::from_vec(data).ok()?;
        let query = request.queries().first()?;

        let qname = normalize_qname(&query.name().to_utf8());
        let qtype = query.query_type().to_string();
        let client_ip = peer.ip();

        // Cache first.
        if let Some(records) = self.cache.get(&qname, &qtype) {
            let mut reply = Message::new(request.id(), MessageType::Response, OpCode::Query);
            reply.set_recursion_desired(request.recursion_desired());
            reply.set_recursion_available(true);
            reply.set_authoritative(false);
            for q in request.queries() {
                reply.add_query(q.clone());
            }
            for record in records {
                reply.add_answer(record);
            }
            self.stats.record_cached();
            self.log(&qname, &qtype, client_ip, QueryAction::Cached, true, 0.0);
            return serialize(&reply).ok();
        }

        // Miss: round-robin over the upstreams.
        let settings = self.settings.load_full();
        match self.upstreams.resolve(&settings, data).await {
            Ok((response_bytes, elapsed_ms)) => Some(self.relay_upstream_reply(
                &request,
                response_bytes,
                elapsed_ms,
                &settings,
                &qname,
                &qtype,
                client_ip,
            )),
            Err(e) => {
                debug!(error = %e, domain = %qname, "All upstreams failed; answering SERVFAIL");
                self.stats.record_error();
                self.log(&qname, &qtype, client_ip, QueryAction::Error, false, 0.0);
                build_servfail(&request).ok()
            }
        }
    }

    /// Cache a successful upstream answer and rewrite it onto the
    /// original request ID.
    #[allow(clippy::too_many_arguments)]
    fn relay_upstream_reply(
        &self,
        request: &Message,
        response_bytes: Vec<u8>,
        elapsed_ms: f64,
        settings: &ResolverSettings,
        qname: &str,
        qtype: &str,
        client_ip: std::net::IpAddr,
    ) -> Vec<u8> {
        match Message::from_vec(&response_bytes) {
            Ok(mut upstream_reply) => {
                if !upstream_reply.answers().is_empty() {
                    let min_ttl = upstream_reply
                        .answers()
                        .iter()
                        .map(|r| r.ttl())
                        .min()
                        .unwrap_or(settings.cache_min_ttl);
                    let ttl = min_ttl.clamp(settings.cache_min_ttl, settings.cache_max_ttl);
                    self.cache
                        .put(qname, qtype, upstream_reply.answers().to_vec(), ttl);
                }

                let nxdomain = upstream_reply.response_code() == ResponseCode::NXDomain;
                self.stats.record_forwarded(elapsed_ms, nxdomain);
                let status = if nxdomain {
                    QueryAction::Nxdomain
                } else {
                    QueryAction::Allowed
                };
                self.log(qname, qtype, client_ip, status, false, elapsed_ms);

                let mut header = *upstream_reply;
                header.set_id(request.id());
                upstream_reply.set_header(header);
                serialize(&upstream_reply).unwrap_or(response_bytes)
            }
            Err(_) => {
                // Unparseable reply: patch the transaction ID in place and
                // relay the bytes as-is.
                let mut bytes = response_bytes;
                if bytes.len() >= 2 {
                    bytes[..2].copy_from_slice(&request.id().to_be_bytes());
                }
                self.stats.record_forwarded(elapsed_ms, false);
                self.log(qname, qtype, client_ip, QueryAction::Allowed, false, elapsed_ms);
                bytes
            }
        }
    }

    fn log(
        &self,
        qname: &str,
        qtype: &str,
        client_ip: std::net::IpAddr,
        status: QueryAction,
        cached: bool,
        upstream_ms: f64,
    ) {
        if !self.settings.load().log_queries {
            return;
        }
        self.logger.log(ResolverEvent::new(
            Arc::from(qname),
            qtype.to_string(),
            client_ip,
            status,
            cached,
            upstream_ms,
        ));
    }
}

#[async_trait::async_trait]
impl ionman_dns_application::ports::ReloadHook for RecursiveResolver {
    async fn reload(&self) {
        self.reload_settings().await;
    }
}

async fn load_settings(path: &str) -> ResolverSettings {
    match read_settings(PathBuf::from(path).as_path()).await {
        Ok(settings) => settings,
        Err(e) => {
            warn!(path, error = %e, "Resolver settings not loaded; using defaults");
            ResolverSettings::default()
        }
    }
}

async fn read_settings(path: &std::path::Path) -> Result<ResolverSettings, DomainError> {
    let raw = tokio::fs::read_to_string(path).await?;
    serde_json::from_str(&raw).map_err(|e| DomainError::CatalogError(e.to_string()))
}
