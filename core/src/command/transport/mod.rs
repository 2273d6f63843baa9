//! Command transports: UDP socket and stdin

mod error;
mod network;
mod stdin;

pub use error::TransportError;
pub use network::NetworkListener;
pub use stdin::{ByteSource, StdinListener, StdinSource};
