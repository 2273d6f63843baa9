//! Error types for command transports

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    /// Address string did not parse
    #[error("invalid address '{addr}': {reason}")]
    InvalidAddress { addr: String, reason: String },
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },
    #[error("failed to set non-blocking: {0}")]
    NonBlocking(std::io::Error),
    /// The input driver already reads stdin
    #[error("stdin is claimed by the input driver")]
    StdinClaimed,
    #[error("stdin commands are not supported on this platform")]
    StdinUnsupported,
}
