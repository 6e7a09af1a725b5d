//! LLM Provider Abstraction
//!
//! Defines the LlmProvider trait for plain-text completion. Providers return
//! the model's reply verbatim; decoding belongs to the caller.
//!
//! ## Modules
//!
//! - `claude_code`: local `claude` CLI in print mode
//! - `openai`, `ollama`: HTTP chat backends sharing `chat`
//! - `retry`: exponential backoff wrapper for retryable error categories

mod chat;
mod claude_code;
mod ollama;
mod openai;
mod retry;

pub use claude_code::ClaudeCodeProvider;
pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;
pub use retry::RetryingProvider;

pub use crate::types::{ErrorCategory, ErrorClassifier, LlmError};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::constants::{network, retry as retry_constants};
use crate::types::{DocError, Result};

// =============================================================================
// Completion Result
// =============================================================================

/// One completed prompt
#[derive(Debug, Clone, Default)]
pub struct LlmResponse {
    /// Reply text exactly as the model produced it
    pub content: String,
    /// Model that answered, when the backend reports it
    pub model: String,
    pub usage: TokenUsage,
    pub elapsed: Duration,
}

impl LlmResponse {
    /// Reply with no usage information
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn new(content: String, model: &str, usage: TokenUsage, elapsed: Duration) -> Self {
        Self {
            content,
            model: model.to_string(),
            usage,
            elapsed,
        }
    }
}

/// Token counts as reported by the backend (zero when unknown)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl TokenUsage {
    pub fn new(input_tokens: u32, output_tokens: u32) -> Self {
        Self {
            input_tokens,
            output_tokens,
        }
    }

    pub fn total(&self) -> u32 {
        self.input_tokens.saturating_add(self.output_tokens)
    }
}

// =============================================================================
// Provider Selection
// =============================================================================

/// Supported backends, as named in `llm.provider`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    ClaudeCode,
    OpenAi,
    Ollama,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 3] = [Self::ClaudeCode, Self::OpenAi, Self::Ollama];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ClaudeCode => "claude-code",
            Self::OpenAi => "openai",
            Self::Ollama => "ollama",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = DocError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                DocError::Config(format!(
                    "Unknown provider: {}. Supported: claude-code, openai, ollama",
                    s
                ))
            })
    }
}

/// Shared LLM provider type for concurrent access across capabilities.
pub type SharedProvider = Arc<dyn LlmProvider + Send + Sync>;

// =============================================================================
// Provider Configuration
// =============================================================================

/// Configuration for LLM providers
///
/// Note: API keys are never serialized to output and are redacted in debug
/// output. Each provider converts the key to SecretString internally.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Provider type: "claude-code", "openai", "ollama"
    pub provider: String,
    /// Model name (provider-specific)
    pub model: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Temperature for LLM generation (0.0 = deterministic)
    pub temperature: f32,
    /// Maximum tokens to generate
    pub max_tokens: usize,
    /// Retries for rate limits, network and transient failures
    pub max_retries: usize,
    /// API base URL (for custom endpoints)
    pub api_base: Option<String>,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("max_retries", &self.max_retries)
            .field("api_base", &self.api_base)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider: "claude-code".to_string(),
            model: None,
            timeout_secs: network::DEFAULT_TIMEOUT_SECS,
            temperature: 0.0,
            max_tokens: 4096,
            max_retries: retry_constants::DEFAULT_MAX_RETRIES,
            api_base: None,
            api_key: None,
        }
    }
}

// =============================================================================
// LLM Provider Trait
// =============================================================================

/// Text completion backend
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send one prompt and return the reply text.
    ///
    /// Failures are `DocError::Llm` with a category, so callers can tell
    /// safety refusals and retryable failures apart.
    async fn complete(&self, prompt: &str) -> Result<LlmResponse>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Model name currently in use
    fn model(&self) -> &str;
}

/// Create a shared provider from configuration, wrapped with retries
pub fn create_provider(config: &ProviderConfig) -> Result<SharedProvider> {
    let base: SharedProvider = match config.provider.parse::<ProviderKind>()? {
        ProviderKind::ClaudeCode => Arc::new(ClaudeCodeProvider::new(config.clone())),
        ProviderKind::OpenAi => Arc::new(OpenAiProvider::new(config.clone())?),
        ProviderKind::Ollama => Arc::new(OllamaProvider::new(config.clone())?),
    };

    if config.max_retries == 0 {
        return Ok(base);
    }
    Ok(Arc::new(RetryingProvider::new(base, config.max_retries)))
}
