//! Provider fallback — ordered retry chain with per-provider timeouts.
//!
//! When a provider fails with a transport-class error (network, timeout,
//! 5xx, rate limit), the next provider in the chain is tried. Errors that
//! another backend cannot fix, such as bad credentials, are returned as-is.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ferroact_core::error::ProviderError;
use ferroact_core::message::ChatResponse;
use ferroact_core::provider::{ChatRequest, LlmProvider};
use tracing::{info, warn};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// A provider that wraps an ordered list of providers and falls back on failure.
pub struct FallbackProvider {
    name: String,
    chain: Vec<FallbackEntry>,
}

struct FallbackEntry {
    provider: Arc<dyn LlmProvider>,
    timeout: Duration,
}

impl FallbackProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            chain: Vec::new(),
        }
    }

    /// Append a provider with its own deadline.
    pub fn add(mut self, provider: Arc<dyn LlmProvider>, timeout: Duration) -> Self {
        self.chain.push(FallbackEntry { provider, timeout });
        self
    }

    /// Append a provider with the default deadline (120s).
    pub fn add_default(self, provider: Arc<dyn LlmProvider>) -> Self {
        self.add(provider, DEFAULT_TIMEOUT)
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }
}

#[async_trait]
impl LlmProvider for FallbackProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, ProviderError> {
        let mut last_error = ProviderError::Backend("no providers in fallback chain".into());

        for (i, entry) in self.chain.iter().enumerate() {
            let provider_name = entry.provider.name();
            let deadline = request
                .timeout_ms
                .map(Duration::from_millis)
                .map_or(entry.timeout, |t| t.min(entry.timeout));

            info!(
                provider = %provider_name,
                attempt = i + 1,
                total = self.chain.len(),
                "Fallback: trying provider"
            );

            let err = match tokio::time::timeout(deadline, entry.provider.chat(request.clone()))
                .await
            {
                Ok(Ok(response)) => return Ok(response),
                Ok(Err(e)) => e,
                Err(_) => ProviderError::Timeout(format!(
                    "provider '{provider_name}' timed out after {}ms",
                    deadline.as_millis()
                )),
            };

            if !err.is_transient() {
                warn!(provider = %provider_name, error = %err, "Fallback: non-transient failure, giving up");
                return Err(err);
            }

            warn!(
                provider = %provider_name,
                error = %err,
                "Fallback: provider failed, trying next"
            );
            last_error = err;
        }

        Err(last_error)
    }
}
