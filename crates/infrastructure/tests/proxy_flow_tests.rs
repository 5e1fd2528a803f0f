use hickory_proto::op::{Message, ResponseCode};
use hickory_proto::rr::{RData, RecordType};
use ionman_dns_domain::config::ProxyConfig;
use ionman_dns_domain::{Category, QueryAction, QueryEvent, RuleSnapshot};
use ionman_dns_infrastructure::dns::proxy::FrontProxy;
use ionman_dns_infrastructure::dns::rule_engine::RuleEngine;
use ionman_dns_infrastructure::logging::event_queue;
use rustc_hash::FxHashMap;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio::time::{timeout, Duration};
use tokio_util::sync::CancellationToken;

mod helpers;
use helpers::upstream_mock::{build_query, MockUpstream, UpstreamMode};

fn category(key: &str, domains: &[&str]) -> Category {
    Category {
        key: key.to_string(),
        label: key.to_string(),
        domains: domains.iter().map(|d| d.to_string()).collect(),
    }
}

/// Snapshot used across the flow tests: ads+social+porn globally on,
/// example.com whitelisted.
fn test_snapshot() -> RuleSnapshot {
    let mut snapshot = RuleSnapshot::empty();
    snapshot.categories = vec![
        category("ads", &["doubleclick.net"]),
        category("social", &["tiktok.com"]),
        category("porn", &["pornhub.com"]),
    ];
    snapshot.global_categories.insert("ads".into(), true);
    snapshot.global_categories.insert("social".into(), true);
    snapshot.global_categories.insert("porn".into(), true);
    snapshot.whitelist.insert("example.com".into());
    snapshot
}

struct ProxyHarness {
    addr: SocketAddr,
    events: mpsc::Receiver<QueryEvent>,
    shutdown: CancellationToken,
    _upstream: MockUpstream,
}

async fn start_proxy(snapshot: RuleSnapshot, mode: UpstreamMode, timeout_secs: u64) -> ProxyHarness {
    let upstream = MockUpstream::start(mode).await.unwrap();
    let engine = Arc::new(RuleEngine::new());
    engine.publish(Arc::new(snapshot));

    let config = ProxyConfig {
        listen_addr: "127.0.0.1".into(),
        listen_port: 0,
        upstream_addr: "127.0.0.1".into(),
        upstream_port: upstream.addr().port(),
        block_ttl: 300,
        upstream_timeout_secs: timeout_secs,
    };

    let (tx, events) = event_queue(1024);
    let proxy = Arc::new(FrontProxy::bind(&config, engine, tx).await.unwrap());
    let addr = proxy.local_addr().unwrap();
    let shutdown = CancellationToken::new();
    tokio::spawn(proxy.run(shutdown.clone()));

    ProxyHarness {
        addr,
        events,
        shutdown,
        _upstream: upstream,
    }
}

async fn exchange(addr: SocketAddr, request: &[u8]) -> Message {
    let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    client.send_to(request, addr).await.unwrap();
    let mut buf = vec![0u8; 4096];
    let (len, _) = timeout(Duration::from_secs(10), client.recv_from(&mut buf))
        .await
        .expect("proxy reply timed out")
        .unwrap();
    Message::from_vec(&buf[..len]).unwrap()
}

async fn next_event(harness: &mut ProxyHarness) -> QueryEvent {
    timeout(Duration::from_secs(2), harness.events.recv())
        .await
        .expect("log event timed out")
        .expect("event queue closed")
}

#[tokio::test]
async fn whitelisted_domain_is_forwarded_despite_block_rules() {
    let mut snapshot = test_snapshot();
    // Even an explicit ads entry cannot beat the whitelist.
    snapshot.categories[0].domains.insert("example.com".into());
    let mut harness = start_proxy(
        snapshot,
        UpstreamMode::Answer(Ipv4Addr::new(93, 184, 216, 34), 100),
        5,
    )
    .await;

    let reply = exchange(harness.addr, &build_query(0x1111, "example.com.", RecordType::A)).await;

    assert_eq!(reply.id(), 0x1111);
    assert!(matches!(
        reply.answers()[0].data(),
        RData::A(a) if a.0 == Ipv4Addr::new(93, 184, 216, 34)
    ));

    let event = next_event(&mut harness).await;
    assert_eq!(event.action, QueryAction::Allowed);
    assert_eq!(event.domain.as_ref(), "example.com");
    harness.shutdown.cancel();
}

#[tokio::test]
async fn subdomain_of_blocked_category_gets_sinkhole_a() {
    let mut harness = start_proxy(
        test_snapshot(),
        UpstreamMode::Answer(Ipv4Addr::new(1, 2, 3, 4), 100),
        5,
    )
    .await;

    let reply = exchange(
        harness.addr,
        &build_query(0x2222, "v16.tiktokcdn.com.tiktok.com.", RecordType::A),
    )
    .await;

    assert_eq!(reply.id(), 0x2222);
    let record = &reply.answers()[0];
    assert_eq!(record.ttl(), 300);
    assert!(matches!(record.data(), RData::A(a) if a.0 == Ipv4Addr::UNSPECIFIED));

    let event = next_event(&mut harness).await;
    assert_eq!(event.action, QueryAction::Blocked);
    harness.shutdown.cancel();
}

#[tokio::test]
async fn per_peer_override_lifts_the_block() {
    let mut snapshot = test_snapshot();
    // Tests run over loopback, so the client key is 127.0.0.1.
    let mut rules: FxHashMap<String, bool> = FxHashMap::default();
    rules.insert("social".into(), false);
    snapshot.peer_categories.insert("127.0.0.1".into(), rules);

    let mut harness = start_proxy(
        snapshot,
        UpstreamMode::Answer(Ipv4Addr::new(1, 2, 3, 4), 100),
        5,
    )
    .await;

    let reply = exchange(harness.addr, &build_query(0x3333, "www.tiktok.com.", RecordType::A)).await;

    assert!(matches!(
        reply.answers()[0].data(),
        RData::A(a) if a.0 == Ipv4Addr::new(1, 2, 3, 4)
    ));
    let event = next_event(&mut harness).await;
    assert_eq!(event.action, QueryAction::Allowed);
    harness.shutdown.cancel();
}

#[tokio::test]
async fn aaaa_block_shape_is_unspecified_v6() {
    let mut harness = start_proxy(
        test_snapshot(),
        UpstreamMode::Answer(Ipv4Addr::new(1, 2, 3, 4), 100),
        5,
    )
    .await;

    let reply = exchange(harness.addr, &build_query(0x4444, "pornhub.com.", RecordType::AAAA)).await;

    let record = &reply.answers()[0];
    assert_eq!(record.ttl(), 300);
    assert!(matches!(
        record.data(),
        RData::AAAA(aaaa) if aaaa.0 == std::net::Ipv6Addr::UNSPECIFIED
    ));
    let event = next_event(&mut harness).await;
    assert_eq!(event.action, QueryAction::Blocked);
    harness.shutdown.cancel();
}

#[tokio::test]
async fn https_block_shape_is_empty_nxdomain() {
    let mut harness = start_proxy(
        test_snapshot(),
        UpstreamMode::Answer(Ipv4Addr::new(1, 2, 3, 4), 100),
        5,
    )
    .await;

    let reply = exchange(harness.addr, &build_query(0x5555, "pornhub.com.", RecordType::HTTPS)).await;

    assert_eq!(reply.response_code(), ResponseCode::NXDomain);
    assert!(reply.answers().is_empty());
    let event = next_event(&mut harness).await;
    assert_eq!(event.action, QueryAction::Blocked);
    harness.shutdown.cancel();
}

#[tokio::test]
async fn upstream_silence_yields_servfail_logged_allowed() {
    let mut harness = start_proxy(test_snapshot(), UpstreamMode::Silent, 1).await;

    let reply = exchange(harness.addr, &build_query(0x6666, "slow.example.", RecordType::A)).await;

    assert_eq!(reply.id(), 0x6666);
    assert_eq!(reply.response_code(), ResponseCode::ServFail);
    let event = next_event(&mut harness).await;
    assert_eq!(event.action, QueryAction::Allowed);
    harness.shutdown.cancel();
}

#[tokio::test]
async fn upstream_sinkhole_answer_is_tagged_blocked() {
    let mut harness = start_proxy(test_snapshot(), UpstreamMode::Sinkhole, 5).await;

    let reply = exchange(harness.addr, &build_query(0x7777, "tracker.example.", RecordType::A)).await;

    // The bytes are relayed unchanged; only the log tag differs.
    assert!(matches!(
        reply.answers()[0].data(),
        RData::A(a) if a.0 == Ipv4Addr::UNSPECIFIED
    ));
    let event = next_event(&mut harness).await;
    assert_eq!(event.action, QueryAction::Blocked);
    harness.shutdown.cancel();
}
