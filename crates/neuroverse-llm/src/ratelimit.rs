//! Rate-limit classification
//!
//! Providers do not share an error envelope, so whether a failure means
//! "try the next provider" is decided from the status and the text the
//! provider sent back. Only provider-authored text is searched: provider
//! names, endpoints and local transport errors never are. Everything the
//! fallback loop needs to know lives in [`is_rate_limit`].

use crate::LlmError;

/// Phrases that mark a failure as a rate limit (matched lowercase)
const RATE_LIMIT_MARKERS: &[&str] = &["429", "rate limit", "quota", "limit exceeded"];

/// Whether `err` should make the router fall through to the next provider
pub fn is_rate_limit(err: &LlmError) -> bool {
    match err {
        LlmError::UpstreamRejected { status, body, .. } => {
            *status == 429 || mentions_rate_limit(body)
        }
        LlmError::Stream { message, .. } => mentions_rate_limit(message),
        // The provider never answered, so there is nothing to classify
        LlmError::Transport { .. } => false,
        // Setup problems are never a reason to try someone else
        LlmError::NoProviderConfigured
        | LlmError::Config(_)
        | LlmError::AllProvidersExhausted { .. } => false,
        LlmError::Other(message) => mentions_rate_limit(message),
    }
}

/// Substring heuristic over free-form error text
pub fn mentions_rate_limit(description: &str) -> bool {
    let lower = description.to_lowercase();
    RATE_LIMIT_MARKERS.iter().any(|marker| lower.contains(marker))
}
