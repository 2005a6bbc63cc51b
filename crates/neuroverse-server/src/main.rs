//! NeuroVerse server binary
//!
//! Loads configuration and starts the HTTP server.

use anyhow::Context;
use clap::Parser;
use neuroverse_server::{config::ServerConfig, start_server};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// NeuroVerse - personal dashboard server
#[derive(Debug, Parser)]
#[command(name = "neuroverse-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "NEUROVERSE_CONFIG")]
    config: Option<PathBuf>,

    /// Override the bind port
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Log to stderr; RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ServerConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ServerConfig::from_toml("")?
            .with_env_overrides(|name| std::env::var(name).ok())
            .context("no config file given and environment is incomplete")?,
    };

    if let Some(port) = args.port {
        config.bind_port = port;
    }

    start_server(config).await?;
    Ok(())
}
