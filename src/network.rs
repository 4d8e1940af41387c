//! Local network address discovery
//!
//! Finds the address other devices on the LAN can use to reach this machine.
//! Connecting a UDP socket sends nothing; it only makes the kernel pick the
//! outgoing interface, whose address is then read back.

use crate::logger;
use socket2::{Domain, Protocol, Socket, Type};
use std::io;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

/// Any routable public address works; nothing is ever sent to it
pub const PROBE_TARGET: SocketAddrV4 = SocketAddrV4::new(Ipv4Addr::new(8, 8, 8, 8), 1);

/// Returned whenever probing fails
pub const FALLBACK_ADDR: Ipv4Addr = Ipv4Addr::LOCALHOST;

/// Best-effort LAN address of this machine, `127.0.0.1` if it cannot be found
pub fn local_ip() -> Ipv4Addr {
    probe_local_ip(SocketAddr::V4(PROBE_TARGET))
}

/// Probe the local address the OS would use to reach `target`.
///
/// Never fails: errors and unspecified results both yield [`FALLBACK_ADDR`].
pub fn probe_local_ip(target: SocketAddr) -> Ipv4Addr {
    match try_probe(target) {
        Ok(ip) if !ip.is_unspecified() => ip,
        Ok(_) => {
            logger::log_debug("Local IP probe returned an unspecified address, using loopback");
            FALLBACK_ADDR
        }
        Err(e) => {
            logger::log_debug(&format!("Local IP probe via {target} failed: {e}, using loopback"));
            FALLBACK_ADDR
        }
    }
}

// The socket is dropped (closed) on every return path
fn try_probe(target: SocketAddr) -> io::Result<Ipv4Addr> {
    let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
    socket.connect(&target.into())?;

    socket
        .local_addr()?
        .as_socket_ipv4()
        .map(|addr| *addr.ip())
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "local address is not IPv4"))
}
