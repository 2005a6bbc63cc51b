//! Provider descriptors
//!
//! The set of providers is closed: four free-tier services, all spoken to
//! through an OpenAI-compatible chat-completions endpoint. Declaration order
//! in [`ProviderKind::PRIORITY`] is the default fallback order.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default completion budget per request
pub const DEFAULT_MAX_TOKENS: u32 = 2048;

/// Site reported to OpenRouter in the `HTTP-Referer` header
pub const OPENROUTER_REFERER: &str = "https://nikki-hub.vercel.app";

/// Application title reported to OpenRouter in the `X-Title` header
pub const OPENROUTER_TITLE: &str = "NeuroVerse";

/// Response envelope a provider streams back
///
/// Every built-in provider streams `choices[0].delta.content` frames. A
/// provider with a different envelope needs its own variant and decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireFormat {
    /// OpenAI chat-completions server-sent events
    #[default]
    OpenAiCompatible,
}

/// One of the built-in completion providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Groq (OpenAI-compatible endpoint)
    Groq,
    /// OpenRouter
    OpenRouter,
    /// Google Gemini (OpenAI-compatible endpoint)
    Gemini,
    /// Mistral
    Mistral,
}

impl ProviderKind {
    /// Built-in fallback order
    pub const PRIORITY: [ProviderKind; 4] = [
        ProviderKind::Groq,
        ProviderKind::OpenRouter,
        ProviderKind::Gemini,
        ProviderKind::Mistral,
    ];

    /// Identifier used in logs, errors and configuration
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Groq => "groq",
            ProviderKind::OpenRouter => "openrouter",
            ProviderKind::Gemini => "gemini",
            ProviderKind::Mistral => "mistral",
        }
    }

    /// Model requested when configuration does not override it
    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::Groq => "llama-3.3-70b-versatile",
            ProviderKind::OpenRouter => "meta-llama/llama-3.3-70b-instruct:free",
            ProviderKind::Gemini => "gemini-1.5-flash",
            ProviderKind::Mistral => "mistral-small-latest",
        }
    }

    /// Chat-completions endpoint
    pub fn default_endpoint(&self) -> &'static str {
        match self {
            ProviderKind::Groq => "https://api.groq.com/openai/v1/chat/completions",
            ProviderKind::OpenRouter => "https://openrouter.ai/api/v1/chat/completions",
            ProviderKind::Gemini => {
                "https://generativelanguage.googleapis.com/v1beta/openai/chat/completions"
            }
            ProviderKind::Mistral => "https://api.mistral.ai/v1/chat/completions",
        }
    }

    /// Environment variable holding the API key
    pub fn api_key_env(&self) -> &'static str {
        match self {
            ProviderKind::Groq => "GROQ_API_KEY",
            ProviderKind::OpenRouter => "OPENROUTER_API_KEY",
            ProviderKind::Gemini => "GEMINI_API_KEY",
            ProviderKind::Mistral => "MISTRAL_API_KEY",
        }
    }

    /// Headers sent in addition to `Authorization` and `Content-Type`
    pub fn extra_headers(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            ProviderKind::OpenRouter => &[
                ("HTTP-Referer", OPENROUTER_REFERER),
                ("X-Title", OPENROUTER_TITLE),
            ],
            _ => &[],
        }
    }

    /// Parse a provider from its identifier
    pub fn parse(s: &str) -> Option<Self> {
        Self::PRIORITY
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static, process-wide description of one provider
///
/// Built once at startup. A provider is available when it has a non-empty
/// API key; nothing about availability is learned at runtime.
#[derive(Clone)]
pub struct ProviderDescriptor {
    /// Which built-in provider this is
    pub kind: ProviderKind,

    /// Unique name (defaults to the kind identifier)
    pub name: String,

    /// Model identifier sent in the request body
    pub model: String,

    /// Chat-completions URL
    pub endpoint: String,

    /// Response envelope
    pub wire_format: WireFormat,

    /// Completion budget
    pub max_tokens: u32,

    api_key: Option<String>,
}

impl ProviderDescriptor {
    /// Descriptor with built-in model and endpoint
    pub fn new(kind: ProviderKind, api_key: Option<String>) -> Self {
        Self {
            kind,
            name: kind.as_str().to_string(),
            model: kind.default_model().to_string(),
            endpoint: kind.default_endpoint().to_string(),
            wire_format: WireFormat::OpenAiCompatible,
            max_tokens: DEFAULT_MAX_TOKENS,
            api_key: api_key.filter(|key| !key.trim().is_empty()),
        }
    }

    /// Descriptor whose key is read from the provider's environment variable
    pub fn from_env(kind: ProviderKind) -> Self {
        Self::new(kind, std::env::var(kind.api_key_env()).ok())
    }

    /// Override the model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Override the name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Override the completion budget
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Whether the required credential is present
    pub fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    pub(crate) fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }
}

impl fmt::Debug for ProviderDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderDescriptor")
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("wire_format", &self.wire_format)
            .field("max_tokens", &self.max_tokens)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
