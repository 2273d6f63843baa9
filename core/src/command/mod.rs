//! Remote command interface
//!
//! Commands arrive as newline-terminated text over UDP and/or stdin. Each
//! line is either a bind token, which asserts a virtual button for the
//! current poll window, or an action token with an optional argument, which
//! runs immediately and may reply to its sender.
//!
//! [`CommandInterface::poll`] is called once per frame before input is
//! sampled. It clears the bind state, drains the UDP socket, then performs a
//! single stdin read.

mod parser;
mod reply;
mod send;
mod state;
mod transport;


use std::net::SocketAddr;

use retrocmd_shared::{ActionId, BindId};

use crate::config::CommandConfig;

pub use parser::process_batch;
pub use reply::{NetworkReply, NullReply, ReplySink, WriterReply};
pub use send::{SendError, send_command, send_command_with_reply};
pub use state::CommandState;
pub use transport::{ByteSource, NetworkListener, StdinListener, StdinSource, TransportError};

/// Executes named actions on behalf of the command interface.
pub trait ActionHandler {
    /// Run `action`. `arg` is `None` for actions that take no argument.
    /// Replies, if any, are written to `reply`.
    fn handle_action(
        &mut self,
        action: ActionId,
        arg: Option<&str>,
        reply: &mut dyn ReplySink,
    ) -> bool;
}

/// Transports plus the bind state they populate.
pub struct CommandInterface {
    state: CommandState,
    network: Option<NetworkListener>,
    stdin: Option<StdinListener>,
}

impl CommandInterface {
    /// Build from explicit transports.
    pub fn with_transports(network: Option<NetworkListener>, stdin: Option<StdinListener>) -> Self {
        Self {
            state: CommandState::default(),
            network,
            stdin,
        }
    }

    /// Open the transports enabled in `config`.
    ///
    /// A transport that fails to open is logged and left disabled; the other
    /// one is unaffected. `stdin_claimed` is set when the input driver
    /// already reads stdin.
    pub fn from_config(config: &CommandConfig, stdin_claimed: bool) -> Self {
        Self::open(config, stdin_claimed, StdinListener::stdio)
    }

    /// Like [`from_config`](Self::from_config), with stdin opened by
    /// `open_stdin` instead of the process streams.
    pub fn open(
        config: &CommandConfig,
        stdin_claimed: bool,
        open_stdin: impl FnOnce() -> Result<StdinListener, TransportError>,
    ) -> Self {
        let network = if config.network_enable {
            NetworkListener::bind(&config.network_addr, config.network_port)
                .inspect_err(|e| tracing::error!("network commands disabled: {e}"))
                .ok()
        } else {
            None
        };

        let stdin = if !config.stdin_enable {
            None
        } else if stdin_claimed {
            tracing::warn!("stdin commands disabled: {}", TransportError::StdinClaimed);
            None
        } else {
            open_stdin()
                .inspect_err(|e| tracing::error!("stdin commands disabled: {e}"))
                .ok()
        };

        Self::with_transports(network, stdin)
    }

    /// Whether any transport is open.
    pub fn is_active(&self) -> bool {
        self.network.is_some() || self.stdin.is_some()
    }

    pub fn network_addr(&self) -> Option<SocketAddr> {
        self.network.as_ref().map(NetworkListener::local_addr)
    }

    /// Clear the bind state, then drain UDP followed by stdin.
    pub fn poll(&mut self, handler: &mut dyn ActionHandler) {
        self.state.clear();
        if let Some(network) = &mut self.network {
            network.drain(&mut self.state, handler);
        }
        if let Some(stdin) = &mut self.stdin {
            stdin.drain(&mut self.state, handler);
        }
    }

    pub fn state(&self) -> &CommandState {
        &self.state
    }

    pub fn get(&self, id: BindId) -> bool {
        self.state.get(id)
    }

    pub fn set(&mut self, id: BindId) {
        self.state.set(id);
    }

    pub fn get_index(&self, index: usize) -> bool {
        self.state.get_index(index)
    }

    pub fn set_index(&mut self, index: usize) -> bool {
        self.state.set_index(index)
    }
}
