//! Configuration for the provider chain
//!
//! The chain order is the order of `providers` in the file. API keys are
//! read from each provider's environment variable; an inline `api_key` is
//! accepted for local setups but the environment wins.
//!
//! ```toml
//! max_tokens = 2048
//!
//! [[providers]]
//! kind = "groq"
//!
//! [[providers]]
//! kind = "openrouter"
//! model = "meta-llama/llama-3.3-70b-instruct:free"
//! ```

use crate::provider::{ProviderDescriptor, ProviderKind, DEFAULT_MAX_TOKENS};
use crate::LlmError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One entry of the fallback chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Which built-in provider
    pub kind: ProviderKind,

    /// Skip this provider without removing it from the file
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Model override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Endpoint override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Environment variable override for the API key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,

    /// Inline key (environment takes precedence)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl ProviderConfig {
    /// Entry with built-in settings
    pub fn new(kind: ProviderKind) -> Self {
        Self {
            kind,
            enabled: true,
            model: None,
            endpoint: None,
            api_key_env: None,
            api_key: None,
        }
    }

    /// Environment variable that holds this provider's key
    pub fn key_variable(&self) -> &str {
        self.api_key_env
            .as_deref()
            .unwrap_or_else(|| self.kind.api_key_env())
    }
}

/// Configuration for the provider chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Completion budget per request
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Fallback chain, highest priority first
    #[serde(default = "default_providers")]
    pub providers: Vec<ProviderConfig>,
}

fn default_true() -> bool {
    true
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

fn default_providers() -> Vec<ProviderConfig> {
    ProviderKind::PRIORITY.into_iter().map(ProviderConfig::new).collect()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            max_tokens: default_max_tokens(),
            providers: default_providers(),
        }
    }
}

impl LlmConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_tokens == 0 {
            return Err("max_tokens must be greater than 0".to_string());
        }
        let mut seen = HashSet::new();
        for provider in &self.providers {
            if !seen.insert(provider.kind) {
                return Err(format!("provider '{}' listed more than once", provider.kind));
            }
        }
        Ok(())
    }

    /// Build descriptors, resolving keys through `lookup`
    ///
    /// `lookup` maps an environment variable name to its value.
    pub fn descriptors_with<F>(&self, lookup: F) -> Vec<ProviderDescriptor>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.providers
            .iter()
            .filter(|p| p.enabled)
            .map(|p| {
                let key = lookup(p.key_variable())
                    .filter(|k| !k.trim().is_empty())
                    .or_else(|| p.api_key.clone());

                let mut descriptor =
                    ProviderDescriptor::new(p.kind, key).with_max_tokens(self.max_tokens);
                if let Some(model) = &p.model {
                    descriptor = descriptor.with_model(model.clone());
                }
                if let Some(endpoint) = &p.endpoint {
                    descriptor = descriptor.with_endpoint(endpoint.clone());
                }
                descriptor
            })
            .collect()
    }

    /// Build descriptors from the process environment
    pub fn descriptors_from_env(&self) -> Vec<ProviderDescriptor> {
        self.descriptors_with(|name| std::env::var(name).ok())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, LlmError> {
        let config: LlmConfig = toml::from_str(toml_str)
            .map_err(|e| LlmError::Config(format!("Failed to parse TOML: {}", e)))?;
        config.validate().map_err(LlmError::Config)?;
        Ok(config)
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, LlmError> {
        toml::to_string_pretty(self)
            .map_err(|e| LlmError::Config(format!("Failed to serialize to TOML: {}", e)))
    }
}
