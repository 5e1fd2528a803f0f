//! Synthesized replies for the front proxy.
//!
//! Block answers preserve the request ID and question section and carry
//! the configured block TTL. The shape depends on the query type: A gets
//! `0.0.0.0`, AAAA gets `::`, HTTPS gets an empty NXDOMAIN, and every
//! other type falls back to a single A record of `0.0.0.0`.

use hickory_proto::op::{Message, MessageType, OpCode, ResponseCode};
use hickory_proto::rr::rdata::{A, AAAA};
use hickory_proto::rr::{RData, Record, RecordType};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use ionman_dns_domain::{DomainError, QueryAction};
use std::net::{Ipv4Addr, Ipv6Addr};

/// Start a response that mirrors the request's ID, question and RD flag.
fn response_for(request: &Message) -> Message {
    let mut reply = Message::new(request.id(), MessageType::Response, OpCode::Query);
    reply.set_recursion_desired(request.recursion_desired());
    reply.set_recursion_available(true);
    for query in request.queries() {
        reply.add_query(query.clone());
    }
    reply
}

/// Build the block reply for `request` in wire format.
pub fn build_block_reply(request: &Message, block_ttl: u32) -> Result<Vec<u8>, DomainError> {
    let mut reply = response_for(request);

    if let Some(query) = request.queries().first() {
        let name = query.name().clone();
        match query.query_type() {
            RecordType::A => {
                reply.add_answer(Record::from_rdata(
                    name,
                    block_ttl,
                    RData::A(A(Ipv4Addr::UNSPECIFIED)),
                ));
            }
            RecordType::AAAA => {
                reply.add_answer(Record::from_rdata(
                    name,
                    block_ttl,
                    RData::AAAA(AAAA(Ipv6Addr::UNSPECIFIED)),
                ));
            }
            RecordType::HTTPS => {
                reply.set_response_code(ResponseCode::NXDomain);
            }
            _ => {
                reply.add_answer(Record::from_rdata(
                    name,
                    block_ttl,
                    RData::A(A(Ipv4Addr::UNSPECIFIED)),
                ));
            }
        }
    }

    serialize(&reply)
}

/// SERVFAIL reply used when the forwarding upstream does not answer.
pub fn build_servfail(request: &Message) -> Result<Vec<u8>, DomainError> {
    let mut reply = response_for(request);
    reply.set_response_code(ResponseCode::ServFail);
    serialize(&reply)
}

/// Tag a relayed upstream answer for the query log: any answer RDATA of
/// `0.0.0.0`, `::` or `127.0.0.1` is taken as upstream-side blocking.
/// Unparseable replies count as allowed.
pub fn response_action(response_bytes: &[u8]) -> QueryAction {
    let Ok(message) = Message::from_vec(response_bytes) else {
        return QueryAction::Allowed;
    };
    for record in message.answers() {
        match record.data() {
            RData::A(a) if a.0 == Ipv4Addr::UNSPECIFIED || a.0 == Ipv4Addr::LOCALHOST => {
                return QueryAction::Blocked;
            }
            RData::AAAA(aaaa) if aaaa.0 == Ipv6Addr::UNSPECIFIED => {
                return QueryAction::Blocked;
            }
            _ => {}
        }
    }
    QueryAction::Allowed
}

pub fn serialize(message: &Message) -> Result<Vec<u8>, DomainError> {
    let mut buf = Vec::with_capacity(512);
    let mut encoder = BinEncoder::new(&mut buf);
    message.emit(&mut encoder).map_err(|e| {
        DomainError::InvalidDomainName(format!("Failed to serialize DNS message: {e}"))
    })?;
    Ok(buf)
}
