//! Non-blocking UDP command listener

use std::io::ErrorKind;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};

use retrocmd_shared::MAX_DATAGRAM_SIZE;

use super::error::TransportError;
use crate::command::parser::process_batch;
use crate::command::reply::NetworkReply;
use crate::command::state::CommandState;
use crate::command::ActionHandler;

/// UDP socket receiving newline-delimited commands.
///
/// Every datagram is its own batch; replies go back to its sender.
pub struct NetworkListener {
    socket: UdpSocket,
    local_addr: SocketAddr,
    recv_buf: Vec<u8>,
}

impl NetworkListener {
    /// Bind to `addr:port` (e.g. `0.0.0.0` and 55355).
    pub fn bind(addr: &str, port: u16) -> Result<Self, TransportError> {
        let socket_addr = (addr, port)
            .to_socket_addrs()
            .map_err(|e| TransportError::InvalidAddress {
                addr: addr.to_string(),
                reason: e.to_string(),
            })?
            .next()
            .ok_or_else(|| TransportError::InvalidAddress {
                addr: addr.to_string(),
                reason: "no usable address".to_string(),
            })?;
        Self::bind_addr(socket_addr)
    }

    pub fn bind_addr(addr: SocketAddr) -> Result<Self, TransportError> {
        let socket = UdpSocket::bind(addr).map_err(|source| TransportError::Bind {
            addr: addr.to_string(),
            source,
        })?;
        socket
            .set_nonblocking(true)
            .map_err(TransportError::NonBlocking)?;

        let local_addr = socket.local_addr().map_err(|source| TransportError::Bind {
            addr: addr.to_string(),
            source,
        })?;

        tracing::info!(port = local_addr.port(), "command socket bound");

        Ok(Self {
            socket,
            local_addr,
            recv_buf: vec![0u8; MAX_DATAGRAM_SIZE],
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Process every queued datagram. Returns how many were read.
    pub fn drain(&mut self, state: &mut CommandState, handler: &mut dyn ActionHandler) -> usize {
        let mut count = 0;
        loop {
            match self.socket.recv_from(&mut self.recv_buf) {
                Ok((len, peer)) => {
                    count += 1;
                    let text = String::from_utf8_lossy(&self.recv_buf[..len]);
                    tracing::trace!(%peer, len, "command datagram");
                    let mut reply = NetworkReply::new(&self.socket, peer);
                    process_batch(&text, state, handler, &mut reply);
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => break,
                // Windows reports ICMP port unreachable from an earlier reply here
                Err(e) if e.kind() == ErrorKind::ConnectionReset => continue,
                Err(e) => {
                    tracing::warn!("command socket receive failed: {e}");
                    break;
                }
            }
        }
        count
    }
}
