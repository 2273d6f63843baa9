//! Listen command - headless frontend driven by remote commands
//!
//! Runs the dispatcher against in-memory collaborators so scripts can be
//! developed and tested without a real core. Save states, save RAM and
//! memory commands all work against the headless core's RAM.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;
use retrocmd_core::config::{self, Config};
use retrocmd_core::{Dispatcher, EventCommand, Runloop, Services};

/// Arguments for the listen command
#[derive(Args)]
pub struct ListenArgs {
    /// Config file (defaults to the platform config directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// UDP port to listen on (overrides the config)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Address to bind (overrides the config)
    #[arg(long)]
    pub addr: Option<String>,

    /// Also read commands from stdin
    #[arg(long)]
    pub stdin: bool,

    /// Disable the UDP listener
    #[arg(long)]
    pub no_network: bool,

    /// Core to load before listening
    #[arg(long)]
    pub core: Option<PathBuf>,

    /// Content to load (requires --core)
    #[arg(long, requires = "core")]
    pub content: Option<PathBuf>,

    /// Frames per second
    #[arg(long, default_value = "60")]
    pub frame_rate: u32,
}

fn load_config(path: Option<&PathBuf>) -> Result<(Config, Option<PathBuf>)> {
    match path {
        Some(path) => {
            let config = Config::load_from(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?;
            Ok((config, Some(path.clone())))
        }
        None => Ok((config::load(), config::default_config_path())),
    }
}

pub fn execute(args: ListenArgs) -> Result<()> {
    let (mut config, config_path) = load_config(args.config.as_ref())?;

    config.command.network_enable = !args.no_network;
    config.command.stdin_enable |= args.stdin;
    if let Some(port) = args.port {
        config.command.network_port = port;
    }
    if let Some(addr) = args.addr {
        config.command.network_addr = addr;
    }
    if !config.command.network_enable && !config.command.stdin_enable {
        bail!("No command transport enabled (use --stdin or drop --no-network)");
    }

    let mut dispatcher = Dispatcher::new(config, Services::headless());
    if let Some(path) = config_path {
        dispatcher = dispatcher.with_config_path(path);
    }

    dispatcher.execute(EventCommand::DriversInit);
    dispatcher.execute(EventCommand::HistoryInit);
    if !dispatcher.execute(EventCommand::CommandInit) {
        bail!("Failed to open any command transport");
    }
    if let Some(addr) = dispatcher.command_interface().and_then(|c| c.network_addr()) {
        tracing::info!(%addr, "listening for commands");
    }

    if let Some(core) = args.core {
        if !dispatcher.execute(EventCommand::LoadCore(core.clone())) {
            bail!("Failed to load core {}", core.display());
        }
        let started = match args.content {
            Some(content) => dispatcher.execute(EventCommand::LoadContent(content)),
            None => dispatcher.execute(EventCommand::CoreInit(retrocmd_core::CoreType::NoContent)),
        };
        if !started {
            bail!("Failed to start the core");
        }
    }

    let mut runloop = Runloop::new(dispatcher).with_frame_rate(args.frame_rate);
    runloop.run();

    let mut dispatcher = runloop.into_dispatcher();
    if dispatcher.state().core_loaded() {
        dispatcher.execute(EventCommand::UnloadCore);
    }
    dispatcher.execute(EventCommand::HistoryDeinit);
    dispatcher.execute(EventCommand::CommandDeinit);
    dispatcher.execute(EventCommand::DriversDeinit);
    Ok(())
}
