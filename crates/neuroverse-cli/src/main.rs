//! NeuroVerse CLI - Chat and brain dumps from the terminal.

use clap::Parser;
use neuroverse_cli::cli::ChatArgs;
use neuroverse_cli::commands;
use neuroverse_cli::repl;
use neuroverse_cli::{Cli, Command, Config, Formatter};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Log to stderr so replies on stdout stay clean
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    let format = cli.format.map(Into::into).unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    let router = commands::build_router(&config)?;

    match cli.command {
        Some(Command::Providers) => {
            commands::execute_providers(&router, &formatter)?;
        }
        Some(Command::Dump(args)) => {
            commands::execute_dump(args, router, config.extractor.clone(), &formatter).await?;
        }
        Some(Command::Ask(args)) => {
            commands::execute_ask(args, &router, &formatter).await?;
        }
        Some(Command::Chat(args)) => {
            repl::run_chat(args, &router, &config, &formatter).await?;
        }
        None => {
            let args = ChatArgs {
                persona: Default::default(),
            };
            repl::run_chat(args, &router, &config, &formatter).await?;
        }
    }

    Ok(())
}
