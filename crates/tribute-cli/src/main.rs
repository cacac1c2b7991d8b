//! tributes - a command-line client for the memorial guestbook.
//!
//! Reads tributes from the local cache, syncs them from the hosted backend,
//! and submits or deletes this device's own tributes.

mod app;
mod cli;

use std::io;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tribute_core::Config;

use app::{handle_config, App};
use cli::{Cli, Command};

/// Initialize the tracing subscriber for logging.
/// RUST_LOG takes precedence over the verbosity flags.
fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(cli.log_level());

    let config = Config::load()?;
    let open = || App::new(config.clone(), cli.endpoint.clone());
    info!("tributes starting");

    match cli.command {
        Command::Sync => open()?.sync().await,
        Command::List(ref cmd) => open()?.list(cmd),
        Command::Submit(ref cmd) => open()?.submit(cmd).await,
        Command::Delete { ref id, yes } => open()?.delete(id, yes).await,
        Command::Clear { yes } => open()?.clear(yes),
        Command::Whoami => {
            open()?.whoami();
            Ok(())
        }
        Command::Config(ref cmd) => handle_config(config.clone(), cmd),
    }
}
