//! Parsing of the `command;host;port` syntax used to send a command to a
//! running frontend.

use thiserror::Error;

use crate::commands::is_known_command;
use crate::constants::{DEFAULT_NETWORK_CMD_PORT, DEFAULT_SEND_HOST, SEND_SPEC_SEPARATOR};

/// A validated command plus its destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendSpec {
    pub command: String,
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendSpecError {
    #[error("no command given")]
    Empty,
    #[error("too many fields in '{0}' (expected command;host;port)")]
    TooManyFields(String),
    #[error("unrecognized command '{0}'")]
    UnknownCommand(String),
    #[error("invalid port '{0}'")]
    InvalidPort(String),
}

impl SendSpec {
    /// Parse `command[;host[;port]]`.
    ///
    /// Empty host or port fields fall back to loopback and the default port.
    /// The command token is checked against the command table so typos are
    /// reported locally instead of being silently dropped by the receiver.
    pub fn parse(spec: &str) -> Result<Self, SendSpecError> {
        let mut fields = spec.split(SEND_SPEC_SEPARATOR);

        let command = fields.next().unwrap_or_default();
        if command.is_empty() {
            return Err(SendSpecError::Empty);
        }

        let host = match fields.next() {
            Some(host) if !host.is_empty() => host.to_string(),
            _ => DEFAULT_SEND_HOST.to_string(),
        };

        let port = match fields.next() {
            Some(port) if !port.is_empty() => port
                .parse::<u16>()
                .map_err(|_| SendSpecError::InvalidPort(port.to_string()))?,
            _ => DEFAULT_NETWORK_CMD_PORT,
        };

        if fields.next().is_some() {
            return Err(SendSpecError::TooManyFields(spec.to_string()));
        }

        if !is_known_command(command) {
            return Err(SendSpecError::UnknownCommand(command.to_string()));
        }

        Ok(Self {
            command: command.to_string(),
            host,
            port,
        })
    }

    /// The datagram payload for this command.
    pub fn payload(&self) -> String {
        format!("{}\n", self.command)
    }
}
