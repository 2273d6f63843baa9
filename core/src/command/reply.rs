//! Reply sinks
//!
//! A sink is built for each incoming batch and handed down to the actions it
//! triggers, so replies always go back to the transport that asked.

use std::io::Write;
use std::net::{SocketAddr, UdpSocket};

/// Destination for an action's textual reply.
pub trait ReplySink {
    fn reply(&mut self, data: &[u8]);
}

/// Sends replies as datagrams to the peer that sent the batch.
pub struct NetworkReply<'a> {
    socket: &'a UdpSocket,
    peer: SocketAddr,
}

impl<'a> NetworkReply<'a> {
    pub fn new(socket: &'a UdpSocket, peer: SocketAddr) -> Self {
        Self { socket, peer }
    }
}

impl ReplySink for NetworkReply<'_> {
    fn reply(&mut self, data: &[u8]) {
        if let Err(e) = self.socket.send_to(data, self.peer) {
            tracing::warn!(peer = %self.peer, "failed to send reply: {e}");
        }
    }
}

/// Writes replies to a stream (stdout for the stdin transport).
pub struct WriterReply<'a> {
    out: &'a mut dyn Write,
}

impl<'a> WriterReply<'a> {
    pub fn new(out: &'a mut dyn Write) -> Self {
        Self { out }
    }
}

impl ReplySink for WriterReply<'_> {
    fn reply(&mut self, data: &[u8]) {
        if let Err(e) = self.out.write_all(data).and_then(|()| self.out.flush()) {
            tracing::warn!("failed to write reply: {e}");
        }
    }
}

/// Discards replies; used when an action is invoked outside a transport.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReply;

impl ReplySink for NullReply {
    fn reply(&mut self, data: &[u8]) {
        tracing::debug!(len = data.len(), "reply dropped, no transport");
    }
}

/// Collects replies in memory.
impl ReplySink for Vec<u8> {
    fn reply(&mut self, data: &[u8]) {
        self.extend_from_slice(data);
    }
}
