//! CLI command definitions and argument parsing.

use crate::config::OutputFormat;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// NeuroVerse CLI - Chat and brain dumps from the terminal.
#[derive(Debug, Parser)]
#[command(name = "neuroverse")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "NEUROVERSE_CLI_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (bare text)
    Quiet,
}

impl From<CliFormat> for OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => OutputFormat::Table,
            CliFormat::Json => OutputFormat::Json,
            CliFormat::Quiet => OutputFormat::Quiet,
        }
    }
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List providers in priority order
    Providers,

    /// Break free-form text into tagged items
    Dump(DumpArgs),

    /// Ask a single question and stream the answer
    Ask(AskArgs),

    /// Enter interactive chat mode
    Chat(ChatArgs),
}

/// Arguments for `dump`.
#[derive(Debug, Args)]
pub struct DumpArgs {
    /// Text to break down (reads stdin when omitted)
    pub text: Option<String>,

    /// Read the text from a file
    #[arg(short = 'i', long, conflicts_with = "text")]
    pub input: Option<PathBuf>,
}

/// Persona and memory options shared by `ask` and `chat`.
#[derive(Debug, Clone, Default, Args)]
pub struct PersonaArgs {
    /// Listening-only persona
    #[arg(long)]
    pub confidant: bool,

    /// File whose contents are injected as memory
    #[arg(short, long)]
    pub memory: Option<PathBuf>,
}

/// Arguments for `ask`.
#[derive(Debug, Args)]
pub struct AskArgs {
    /// The question
    pub message: String,

    #[command(flatten)]
    pub persona: PersonaArgs,
}

/// Arguments for `chat`.
#[derive(Debug, Args)]
pub struct ChatArgs {
    #[command(flatten)]
    pub persona: PersonaArgs,
}
