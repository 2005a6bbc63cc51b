//! NeuroVerse LLM Provider Layer
//!
//! Routes completion requests across a fixed, priority-ordered chain of
//! free-tier providers and relays their streamed output.
//!
//! # Architecture
//!
//! ```text
//! CompletionRequest → ProviderRouter → wire adapter (SSE) → FragmentStream
//!                          │
//!                          └─ rate limited? try the next provider
//! ```
//!
//! # Providers
//!
//! - Groq, OpenRouter, Gemini, Mistral (all OpenAI-compatible streaming)
//! - `MockProvider`: scripted [`CompletionSource`] for tests
//!
//! # Examples
//!
//! ```no_run
//! use neuroverse_domain::Message;
//! use neuroverse_llm::{CompletionRequest, LlmConfig, ProviderRouter};
//!
//! # async fn example() -> Result<(), neuroverse_llm::LlmError> {
//! let router = ProviderRouter::new(LlmConfig::default().descriptors_from_env())?;
//! let request = CompletionRequest::new(vec![Message::user("Hi!")], "Be brief.");
//! let reply = router.complete(&request).await?;
//! println!("{}", reply);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod mock;
pub mod provider;
pub mod ratelimit;
pub mod router;
pub mod wire;

use futures::Stream;
use neuroverse_domain::Message;
use std::future::Future;
use std::pin::Pin;

pub use config::{LlmConfig, ProviderConfig};
pub use error::LlmError;
pub use mock::MockProvider;
pub use provider::{ProviderDescriptor, ProviderKind, WireFormat};
pub use ratelimit::is_rate_limit;
pub use router::ProviderRouter;

/// Lazy, single-pass sequence of text fragments from one provider
///
/// Concatenating the fragments yields the full completion.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String, LlmError>> + Send>>;

/// One completion call: conversation plus system instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    /// Conversation turns, oldest first
    pub messages: Vec<Message>,

    /// Instruction sent as a leading `system` message
    pub system_instruction: String,
}

impl CompletionRequest {
    /// Create a request
    pub fn new(messages: Vec<Message>, system_instruction: impl Into<String>) -> Self {
        Self {
            messages,
            system_instruction: system_instruction.into(),
        }
    }
}

/// Anything that can produce one whole completion
///
/// Implemented by [`ProviderRouter`] and by [`MockProvider`].
pub trait CompletionSource: Send + Sync {
    /// Produce the full completion text for `request`
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl Future<Output = Result<String, LlmError>> + Send;
}
