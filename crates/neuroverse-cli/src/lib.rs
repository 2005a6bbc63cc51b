//! NeuroVerse CLI library.
//!
//! Terminal client that drives the provider chain and the brain-dump
//! pipeline directly, without the HTTP server.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;
pub mod repl;

pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{CliError, Result};
pub use output::Formatter;
