pub mod proxy;
pub mod qname;
pub mod resolver;
pub mod rule_engine;
pub mod transport;

use ionman_dns_domain::DomainError;
use socket2::{Domain, Socket, Type};
use std::net::SocketAddr;
use tokio::net::UdpSocket;

/// Bind a UDP listener with SO_REUSEADDR so fast restarts do not trip
/// over the old socket lingering in the kernel.
pub(crate) fn bind_reuse(addr: SocketAddr) -> Result<UdpSocket, DomainError> {
    let domain = if addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };
    let socket = Socket::new(domain, Type::DGRAM, None)?;
    socket.set_reuse_address(true)?;
    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;
    Ok(UdpSocket::from_std(socket.into())?)
}
