//! Shared types for the retrocmd control interface.
//!
//! Everything here is plain data that both the frontend-side listener and
//! client tools need to agree on: the command table, bind ids, and the wire
//! constants.

pub mod commands;
pub mod constants;
pub mod ids;
pub mod send;

pub use commands::{ACTIONS, ActionId, ActionSpec, Resolved, is_known_command, resolve};
pub use constants::*;
pub use ids::BindId;
pub use send::{SendSpec, SendSpecError};
