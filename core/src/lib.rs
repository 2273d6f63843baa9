//! retrocmd core - command ingestion and event dispatch
//!
//! This crate implements the remote control side of a libretro-style
//! frontend: command transports, the per-frame bind state they fill, and the
//! dispatcher that every lifecycle request runs through.
//!
//! # Architecture
//!
//! - [`CommandInterface`] - UDP and stdin listeners feeding a [`CommandState`]
//! - [`Dispatcher`] - Central [`EventCommand`] executor owning runtime state
//! - [`Services`] - Collaborator traits the dispatcher drives
//! - [`Runloop`] - Per-frame poll, hotkey merge, core step

pub mod command;
pub mod config;
pub mod event;
pub mod message_queue;
pub mod paths;
pub mod runloop;
pub mod services;

#[cfg(test)]
mod integration;
#[cfg(test)]
pub mod test_utils;

// Re-export the command interface
pub use command::{
    ActionHandler, CommandInterface, CommandState, NetworkListener, ReplySink, StdinListener,
    TransportError, process_batch,
};

// Re-export dispatcher types
pub use event::{Dispatcher, EventCommand, MovieMode, RuntimeState};

pub use config::{Config, ConfigError};
pub use message_queue::MessageQueue;
pub use runloop::{Runloop, hotkey_event};
pub use services::{CoreType, Services};

// Re-export shared command types for convenience
pub use retrocmd_shared::{ActionId, BindId};
