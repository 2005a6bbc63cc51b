//! Scripted completion source for tests
//!
//! Replies are keyed by the content of the last message in the request.
//! Nothing touches the network.

use crate::{CompletionRequest, CompletionSource, LlmError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone)]
enum Reply {
    Text(String),
    Error,
    RateLimited,
}

/// Mock completion source for deterministic testing
///
/// # Examples
///
/// ```
/// use neuroverse_domain::Message;
/// use neuroverse_llm::{CompletionRequest, CompletionSource, MockProvider};
///
/// # futures::executor::block_on(async {
/// let mut provider = MockProvider::new("fixed");
/// provider.add_response("ping", "pong");
///
/// let request = CompletionRequest::new(vec![Message::user("ping")], "system");
/// assert_eq!(provider.complete(&request).await.unwrap(), "pong");
/// assert_eq!(provider.call_count(), 1);
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    responses: Arc<Mutex<HashMap<String, Reply>>>,
    call_count: Arc<Mutex<usize>>,
    last_request: Arc<Mutex<Option<CompletionRequest>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockProvider {
    /// Create a MockProvider with a fixed reply for every request
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            responses: Arc::new(Mutex::new(HashMap::new())),
            call_count: Arc::new(Mutex::new(0)),
            last_request: Arc::new(Mutex::new(None)),
        }
    }

    /// Reply with `response` when the last message is `prompt`
    pub fn add_response(&mut self, prompt: impl Into<String>, response: impl Into<String>) {
        lock(&self.responses).insert(prompt.into(), Reply::Text(response.into()));
    }

    /// Fail with a generic error when the last message is `prompt`
    pub fn add_error(&mut self, prompt: impl Into<String>) {
        lock(&self.responses).insert(prompt.into(), Reply::Error);
    }

    /// Fail with a rate-limit rejection when the last message is `prompt`
    pub fn add_rate_limit(&mut self, prompt: impl Into<String>) {
        lock(&self.responses).insert(prompt.into(), Reply::RateLimited);
    }

    /// Number of completions requested so far
    pub fn call_count(&self) -> usize {
        *lock(&self.call_count)
    }

    /// Reset the call count
    pub fn reset_call_count(&self) {
        *lock(&self.call_count) = 0;
    }

    /// The most recent request received
    pub fn last_request(&self) -> Option<CompletionRequest> {
        lock(&self.last_request).clone()
    }

    fn reply_for(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        *lock(&self.call_count) += 1;
        *lock(&self.last_request) = Some(request.clone());

        let key = request
            .messages
            .last()
            .map(|m| m.content.as_str())
            .unwrap_or_default();

        match lock(&self.responses).get(key) {
            Some(Reply::Text(text)) => Ok(text.clone()),
            Some(Reply::Error) => Err(LlmError::Other("Mock error".to_string())),
            Some(Reply::RateLimited) => Err(LlmError::UpstreamRejected {
                provider: "mock".to_string(),
                status: 429,
                body: "rate limit exceeded".to_string(),
            }),
            None => Ok(self.default_response.clone()),
        }
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl CompletionSource for MockProvider {
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<String, LlmError>> + Send {
        let reply = self.reply_for(request);
        async move { reply }
    }
}
