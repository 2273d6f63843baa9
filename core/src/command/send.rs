//! Client side: send one command to a running frontend over UDP

use std::io::ErrorKind;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::time::Duration;

use retrocmd_shared::{MAX_DATAGRAM_SIZE, SendSpec};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SendError {
    #[error("could not resolve {host}:{port}")]
    Resolve { host: String, port: u16 },
    #[error("failed to open socket: {0}")]
    Socket(std::io::Error),
    #[error("failed to send to {addr}: {source}")]
    Send {
        addr: SocketAddr,
        source: std::io::Error,
    },
    #[error("failed to receive reply: {0}")]
    Receive(std::io::Error),
}

/// Open a socket matching `spec`'s resolved address family.
fn connect(spec: &SendSpec) -> Result<(UdpSocket, SocketAddr), SendError> {
    let resolve_err = || SendError::Resolve {
        host: spec.host.clone(),
        port: spec.port,
    };
    let addr = (spec.host.as_str(), spec.port)
        .to_socket_addrs()
        .map_err(|_| resolve_err())?
        .next()
        .ok_or_else(resolve_err)?;

    let local: SocketAddr = if addr.is_ipv4() {
        ([0u8; 4], 0).into()
    } else {
        ([0u16; 8], 0).into()
    };
    let socket = UdpSocket::bind(local).map_err(SendError::Socket)?;
    Ok((socket, addr))
}

/// Send `spec` as a single datagram. Returns the destination address.
pub fn send_command(spec: &SendSpec) -> Result<SocketAddr, SendError> {
    let (socket, addr) = connect(spec)?;
    socket
        .send_to(spec.payload().as_bytes(), addr)
        .map_err(|source| SendError::Send { addr, source })?;
    tracing::debug!(%addr, command = %spec.command, "command sent");
    Ok(addr)
}

/// Send `spec` and wait up to `timeout` for a reply datagram.
///
/// Returns `Ok(None)` when nothing arrives in time; most commands never
/// reply.
pub fn send_command_with_reply(
    spec: &SendSpec,
    timeout: Duration,
) -> Result<Option<String>, SendError> {
    let (socket, addr) = connect(spec)?;
    socket
        .set_read_timeout(Some(timeout))
        .map_err(SendError::Socket)?;
    socket
        .send_to(spec.payload().as_bytes(), addr)
        .map_err(|source| SendError::Send { addr, source })?;

    let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];
    match socket.recv_from(&mut buf) {
        Ok((len, _)) => Ok(Some(String::from_utf8_lossy(&buf[..len]).into_owned())),
        Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => Ok(None),
        Err(e) => Err(SendError::Receive(e)),
    }
}
