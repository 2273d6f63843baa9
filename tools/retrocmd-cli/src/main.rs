//! retrocmd - remote control for a libretro-style frontend
//!
//! # Commands
//!
//! - `retrocmd send` - Send one command to a running frontend over UDP
//! - `retrocmd listen` - Run a headless frontend that accepts commands
//! - `retrocmd commands` - List every command token
//!
//! # Usage
//!
//! ```bash
//! # Pause the frontend on this machine (default port 55355)
//! retrocmd send PAUSE_TOGGLE
//!
//! # Ask a frontend on another host for its version and print the reply
//! retrocmd send "VERSION;192.168.1.20;55355" --reply
//!
//! # Headless listener on UDP and stdin
//! retrocmd listen --stdin --core core.so --content game.bin
//! ```

mod commands;
mod listen;
mod send;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// retrocmd - remote control for a libretro-style frontend
#[derive(Parser)]
#[command(name = "retrocmd")]
#[command(about = "Send commands to a frontend or run a headless command listener")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a command as `command;host;port`
    Send(send::SendArgs),

    /// Run a headless frontend driven by remote commands
    Listen(listen::ListenArgs),

    /// List bind and action tokens
    Commands,
}

fn main() -> Result<()> {
    // Logs go to stderr; stdout carries command replies
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Send(args) => send::execute(args),
        Commands::Listen(args) => listen::execute(args),
        Commands::Commands => {
            commands::execute();
            Ok(())
        }
    }
}
