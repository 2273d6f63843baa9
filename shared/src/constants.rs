//! Centralized constants for the retrocmd control interface.
//!
//! Single source of truth for values shared by the command listener in the
//! frontend and by client tools that send commands to it.

/// Default UDP port the network command listener binds to.
pub const DEFAULT_NETWORK_CMD_PORT: u16 = 55355;

/// Default bind address for the network command listener (all interfaces).
pub const DEFAULT_NETWORK_CMD_ADDR: &str = "0.0.0.0";

/// Default destination host used by the network send helper.
pub const DEFAULT_SEND_HOST: &str = "127.0.0.1";

/// Capacity of the stdin line accumulator.
///
/// A partial line that fills the whole buffer without a newline is discarded.
pub const STDIN_BUFFER_SIZE: usize = 4096;

/// Largest datagram the network listener reads in one `recv_from`.
pub const MAX_DATAGRAM_SIZE: usize = 4096;

/// Upper bound on the byte count accepted by memory read commands.
pub const MAX_MEMORY_REQUEST: usize = 2048;

/// Field separator for the `command;host;port` send syntax.
pub const SEND_SPEC_SEPARATOR: char = ';';
