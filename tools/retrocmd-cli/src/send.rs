//! Send command - one datagram to a running frontend

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use retrocmd_core::command::{send_command, send_command_with_reply};
use retrocmd_shared::SendSpec;

/// Arguments for the send command
#[derive(Args)]
pub struct SendArgs {
    /// `command[;host[;port]]`, e.g. `QUIT` or `VERSION;10.0.0.5;55355`
    pub spec: String,

    /// Wait for a reply and print it
    #[arg(short, long)]
    pub reply: bool,

    /// How long to wait for a reply, in milliseconds
    #[arg(long, default_value = "1000")]
    pub timeout_ms: u64,
}

pub fn execute(args: SendArgs) -> Result<()> {
    let spec = SendSpec::parse(&args.spec)
        .with_context(|| format!("Invalid command spec '{}'", args.spec))?;

    if !args.reply {
        let addr = send_command(&spec).context("Failed to send command")?;
        tracing::info!(%addr, command = %spec.command, "sent");
        return Ok(());
    }

    let timeout = Duration::from_millis(args.timeout_ms.max(1));
    match send_command_with_reply(&spec, timeout).context("Failed to send command")? {
        Some(reply) => print!("{reply}"),
        None => tracing::warn!(
            command = %spec.command,
            timeout_ms = args.timeout_ms,
            "no reply received"
        ),
    }
    Ok(())
}
