//! Error types for provider routing

use thiserror::Error;

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// No provider has a credential; a setup problem, never retried
    #[error(
        "No AI providers configured. Add at least one API key \
         (GROQ_API_KEY, OPENROUTER_API_KEY, GEMINI_API_KEY or MISTRAL_API_KEY)."
    )]
    NoProviderConfigured,

    /// Non-2xx response from a provider
    #[error("{provider} {status}: {body}")]
    UpstreamRejected {
        /// Provider name
        provider: String,
        /// HTTP status code
        status: u16,
        /// Response body as returned by the provider
        body: String,
    },

    /// Error frame received inside an otherwise successful stream
    #[error("{provider} stream error: {message}")]
    Stream {
        /// Provider name
        provider: String,
        /// Error text carried by the frame
        message: String,
    },

    /// Network or transport failure (connect, reset, body read)
    #[error("{provider} request failed: {message}")]
    Transport {
        /// Provider name
        provider: String,
        /// Underlying error text
        message: String,
    },

    /// Every available provider was rate limited
    #[error("All AI providers are rate limited. Last error: {last}")]
    AllProvidersExhausted {
        /// The failure observed on the last provider tried
        last: Box<LlmError>,
    },

    /// Invalid provider configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

impl LlmError {
    /// Name of the provider that produced this error, if any
    pub fn provider(&self) -> Option<&str> {
        match self {
            LlmError::UpstreamRejected { provider, .. }
            | LlmError::Stream { provider, .. }
            | LlmError::Transport { provider, .. } => Some(provider),
            LlmError::AllProvidersExhausted { last } => last.provider(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_rejected_display() {
        let err = LlmError::UpstreamRejected {
            provider: "groq".into(),
            status: 503,
            body: "overloaded".into(),
        };
        assert_eq!(err.to_string(), "groq 503: overloaded");
        assert_eq!(err.provider(), Some("groq"));
    }

    #[test]
    fn test_exhausted_carries_last_error() {
        let err = LlmError::AllProvidersExhausted {
            last: Box::new(LlmError::UpstreamRejected {
                provider: "mistral".into(),
                status: 429,
                body: "slow down".into(),
            }),
        };
        assert!(err.to_string().contains("mistral 429: slow down"));
        assert_eq!(err.provider(), Some("mistral"));
    }
}
