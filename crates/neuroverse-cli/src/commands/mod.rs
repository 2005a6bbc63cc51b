//! Command implementations.

pub mod ask;
pub mod dump;
pub mod providers;

pub use self::ask::{execute_ask, stream_reply};
pub use self::dump::execute_dump;
pub use self::providers::execute_providers;

use crate::cli::PersonaArgs;
use crate::config::Config;
use crate::error::Result;
use neuroverse_llm::ProviderRouter;
use neuroverse_server::prompts::system_prompt;
use std::fs;

/// Build the provider chain from configuration and the environment.
pub fn build_router(config: &Config) -> Result<ProviderRouter> {
    Ok(ProviderRouter::new(config.llm.descriptors_from_env())?)
}

/// System instruction for the chosen persona, with memory from file if given.
pub fn persona_prompt(persona: &PersonaArgs) -> Result<String> {
    let memory = match &persona.memory {
        Some(path) => Some(fs::read_to_string(path)?),
        None => None,
    };
    Ok(system_prompt(persona.confidant, memory.as_deref()))
}
