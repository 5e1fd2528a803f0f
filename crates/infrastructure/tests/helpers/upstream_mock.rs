#![allow(dead_code)]
use hickory_proto::op::{Message, MessageType, OpCode, Query};
use hickory_proto::rr::rdata::A;
use hickory_proto::rr::{DNSClass, Name, RData, Record, RecordType};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use std::net::{Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::sync::oneshot;

/// How the mock upstream responds.
#[derive(Debug, Clone, Copy)]
pub enum UpstreamMode {
    /// Answer every question with this A record.
    Answer(Ipv4Addr, u32),
    /// Answer with the sinkhole address (upstream-side blocking).
    Sinkhole,
    /// Never reply; lets timeout paths fire.
    Silent,
}

/// Scriptable mock DNS upstream for end-to-end tests.
pub struct MockUpstream {
    addr: SocketAddr,
    queries: Arc<AtomicU64>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockUpstream {
    pub async fn start(mode: UpstreamMode) -> std::io::Result<Self> {
        let socket = UdpSocket::bind("127.0.0.1:0").await?;
        let addr = socket.local_addr()?;
        let queries = Arc::new(AtomicU64::new(0));
        let counter = queries.clone();
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            let mut buf = vec![0u8; 4096];
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    result = socket.recv_from(&mut buf) => {
                        let Ok((len, peer)) = result else { break };
                        counter.fetch_add(1, Ordering::SeqCst);
                        if let UpstreamMode::Silent = mode {
                            continue;
                        }
                        if let Some(reply) = Self::build_reply(&buf[..len], mode) {
                            let _ = socket.send_to(&reply, peer).await;
                        }
                    }
                }
            }
        });

        Ok(Self {
            addr,
            queries,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn queries_seen(&self) -> u64 {
        self.queries.load(Ordering::SeqCst)
    }

    fn build_reply(request_bytes: &[u8], mode: UpstreamMode) -> Option<Vec<u8>> {
        let request = Message::from_vec(request_bytes).ok()?;
        let query = request.queries().first()?;

        let mut reply = Message::new(request.id(), MessageType::Response, OpCode::Query);
        reply.set_recursion_desired(request.recursion_desired());
        reply.set_recursion_available(true);
        reply.add_query(query.clone());

        let (address, ttl) = match mode {
            UpstreamMode::Answer(address, ttl) => (address, ttl),
            UpstreamMode::Sinkhole => (Ipv4Addr::UNSPECIFIED, 60),
            UpstreamMode::Silent => return None,
        };
        reply.add_answer(Record::from_rdata(
            query.name().clone(),
            ttl,
            RData::A(A(address)),
        ));

        Some(serialize(&reply))
    }
}

impl Drop for MockUpstream {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Wire-format query for the tests' client side.
pub fn build_query(id: u16, domain: &str, qtype: RecordType) -> Vec<u8> {
    let mut query = Query::new();
    query.set_name(Name::from_str(domain).unwrap());
    query.set_query_type(qtype);
    query.set_query_class(DNSClass::IN);

    let mut message = Message::new(id, MessageType::Query, OpCode::Query);
    message.set_recursion_desired(true);
    message.add_query(query);
    serialize(&message)
}

pub fn serialize(message: &Message) -> Vec<u8> {
    let mut buf = Vec::with_capacity(512);
    let mut encoder = BinEncoder::new(&mut buf);
    message.emit(&mut encoder).expect("serialize DNS message");
    buf
}
