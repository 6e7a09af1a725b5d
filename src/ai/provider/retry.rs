//! Retry wrapper for LLM providers
//!
//! Retries rate limits, network failures, transient server errors and
//! timeouts with exponential backoff. Every other failure (auth, safety,
//! bad request) is returned after the first attempt.

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use std::time::Duration;
use tracing::warn;

use super::{LlmProvider, LlmResponse, SharedProvider};
use crate::constants::retry as retry_constants;
use crate::types::{DocError, Result};

pub struct RetryingProvider {
    inner: SharedProvider,
    backoff: ExponentialBuilder,
}

impl RetryingProvider {
    pub fn new(inner: SharedProvider, max_retries: usize) -> Self {
        let backoff = ExponentialBuilder::default()
            .with_min_delay(Duration::from_millis(retry_constants::BASE_DELAY_MS))
            .with_max_delay(Duration::from_secs(retry_constants::MAX_DELAY_SECS))
            .with_max_times(max_retries)
            .with_jitter();

        Self { inner, backoff }
    }

    /// Override the backoff policy
    pub fn with_backoff(mut self, backoff: ExponentialBuilder) -> Self {
        self.backoff = backoff;
        self
    }
}

#[async_trait]
impl LlmProvider for RetryingProvider {
    async fn complete(&self, prompt: &str) -> Result<LlmResponse> {
        let provider = self.inner.name().to_string();

        (|| async { self.inner.complete(prompt).await })
            .retry(self.backoff)
            .when(DocError::is_recoverable)
            .notify(|err: &DocError, delay: Duration| {
                warn!(
                    provider = %provider,
                    delay_ms = delay.as_millis() as u64,
                    "LLM request failed, retrying: {}",
                    err
                );
            })
            .await
    }

    fn name(&self) -> &str {
        self.inner.name()
    }

    fn model(&self) -> &str {
        self.inner.model()
    }
}
