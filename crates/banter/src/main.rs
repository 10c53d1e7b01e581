//! Banter daemon - stateless relay for gated model APIs

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use banter::config::Config;
use banter::error::Result;
use banter::relay::RelayServer;

/// Banter - conversational companion engine with an edge relay
#[derive(Parser)]
#[command(name = "banter")]
#[command(about = "Relay server forwarding chat traffic to a gated model API")]
#[command(version)]
pub struct Cli {
    /// Path to config file
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the relay server (default command)
    #[command(name = "serve")]
    Serve,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    init_logging();

    let cli = Cli::parse();

    match cli.command {
        None | Some(Command::Serve) => serve(cli.config).await,
    }
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,banter=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn serve(config_path: Option<PathBuf>) -> Result<()> {
    tracing::info!("Starting Banter relay");

    let config = Config::load(config_path.as_deref())?;
    tracing::debug!("Config loaded: {:?}", config.relay);

    RelayServer::new(config.relay).serve().await?;

    tracing::info!("Banter relay stopped");
    Ok(())
}
