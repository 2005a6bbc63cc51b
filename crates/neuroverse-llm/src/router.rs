//! Provider Router
//!
//! Tries providers in priority order and falls through to the next one only
//! when a failure is classified as a rate limit. Any other failure ends the
//! call. Output always comes from exactly one provider.
//!
//! Two ways to consume a completion:
//!
//! - [`ProviderRouter::stream_completion`] (live): a provider is committed
//!   once it yields its first fragment. Rate limits seen before that point
//!   fall through; anything after it reaches the caller as a stream error.
//! - [`ProviderRouter::complete`] (buffered): each candidate's output is
//!   accumulated privately, so a rate limit at any point, mid-stream
//!   included, discards that candidate's text and moves on.

use crate::provider::ProviderDescriptor;
use crate::ratelimit::is_rate_limit;
use crate::wire;
use crate::{CompletionRequest, CompletionSource, FragmentStream, LlmError};
use futures::future;
use futures::stream::{self, StreamExt, TryStreamExt};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

/// Ordered fallback chain over a fixed set of providers
#[derive(Debug, Clone)]
pub struct ProviderRouter {
    providers: Arc<[ProviderDescriptor]>,
    client: reqwest::Client,
}

impl ProviderRouter {
    /// Create a router over `providers`, in the given priority order
    ///
    /// Provider names must be unique.
    pub fn new(providers: Vec<ProviderDescriptor>) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| LlmError::Config(format!("failed to build HTTP client: {}", e)))?;

        Self::with_client(providers, client)
    }

    /// Create a router that shares an existing HTTP client
    pub fn with_client(
        providers: Vec<ProviderDescriptor>,
        client: reqwest::Client,
    ) -> Result<Self, LlmError> {
        let mut seen = HashSet::new();
        for provider in &providers {
            if !seen.insert(provider.name.as_str()) {
                return Err(LlmError::Config(format!(
                    "duplicate provider name '{}'",
                    provider.name
                )));
            }
        }

        Ok(Self {
            providers: providers.into(),
            client,
        })
    }

    /// Every configured provider, in priority order
    pub fn providers(&self) -> &[ProviderDescriptor] {
        &self.providers
    }

    /// Providers whose credential is present, in priority order
    pub fn list_available(&self) -> Vec<&ProviderDescriptor> {
        self.providers.iter().filter(|p| p.is_available()).collect()
    }

    fn available_or_fail(&self) -> Result<Vec<&ProviderDescriptor>, LlmError> {
        let available = self.list_available();
        if available.is_empty() {
            return Err(LlmError::NoProviderConfigured);
        }
        Ok(available)
    }

    /// Stream one completion from the first provider that is not rate limited
    ///
    /// Resolves once a provider has been committed (first fragment received,
    /// or a successful empty stream). Dropping the returned stream closes the
    /// upstream connection.
    pub async fn stream_completion(
        &self,
        request: &CompletionRequest,
    ) -> Result<FragmentStream, LlmError> {
        let available = self.available_or_fail()?;
        let mut last_error = None;

        for provider in available {
            info!("Trying provider {} ({})", provider.name, provider.model);

            match Self::open_committed(&self.client, provider, request).await {
                Ok(stream) => return Ok(stream),
                Err(e) if is_rate_limit(&e) => {
                    warn!("{} rate limited, trying next provider: {}", provider.name, e);
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(Self::exhausted(last_error))
    }

    /// Open a provider stream and wait for its first fragment
    async fn open_committed(
        client: &reqwest::Client,
        provider: &ProviderDescriptor,
        request: &CompletionRequest,
    ) -> Result<FragmentStream, LlmError> {
        let mut stream = wire::open_stream(client, provider, request).await?;

        match stream.next().await {
            Some(Ok(first)) => {
                info!("Streaming from {}", provider.name);
                let head = stream::once(future::ready(Ok(first)));
                Ok(Box::pin(head.chain(stream)))
            }
            Some(Err(e)) => Err(e),
            None => {
                info!("{} finished without output", provider.name);
                Ok(Box::pin(stream::empty()))
            }
        }
    }

    /// Produce one whole completion, discarding partial output on rate limit
    pub async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let available = self.available_or_fail()?;
        let mut last_error = None;

        for provider in available {
            info!("Trying provider {} ({})", provider.name, provider.model);

            match Self::collect(&self.client, provider, request).await {
                Ok(text) => {
                    info!("{} produced {} chars", provider.name, text.len());
                    return Ok(text);
                }
                Err(e) if is_rate_limit(&e) => {
                    warn!(
                        "{} rate limited, discarding partial output and trying next provider: {}",
                        provider.name, e
                    );
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(Self::exhausted(last_error))
    }

    async fn collect(
        client: &reqwest::Client,
        provider: &ProviderDescriptor,
        request: &CompletionRequest,
    ) -> Result<String, LlmError> {
        let mut stream = wire::open_stream(client, provider, request).await?;
        let mut text = String::new();
        while let Some(fragment) = stream.try_next().await? {
            text.push_str(&fragment);
        }
        Ok(text)
    }

    fn exhausted(last_error: Option<LlmError>) -> LlmError {
        match last_error {
            Some(last) => LlmError::AllProvidersExhausted {
                last: Box::new(last),
            },
            None => LlmError::NoProviderConfigured,
        }
    }
}

impl CompletionSource for ProviderRouter {
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<String, LlmError>> + Send {
        ProviderRouter::complete(self, request)
    }
}
