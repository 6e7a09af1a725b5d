//! Unified Error Type System
//!
//! Centralized error types for the whole crate.
//!
//! ## Layers
//!
//! - **Capability failures**: `ContentFetchError`, `GenerationError`,
//!   `VerificationError`, `TranslationError`, one per external collaborator.
//!   Each failure is scoped to one path/language request.
//! - **Provider errors**: `LlmError` with an `ErrorCategory` used for retry
//!   decisions and for mapping into capability failures.
//! - **Application error**: `DocError`, the single error type returned by
//!   library operations.

use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Capability Failures
// =============================================================================

/// Failure fetching a fingerprint, content or file list from a content source
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ContentFetchError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Transport or IO failure that is none of the above
    #[error("source unavailable: {0}")]
    Unavailable(String),
}

/// Failure producing documentation text
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GenerationError {
    #[error("generation blocked by safety filter: {0}")]
    SafetyBlocked(String),

    #[error("generation service error: {0}")]
    ServiceError(String),
}

/// Failure obtaining a verification verdict
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VerificationError {
    #[error("verification service error: {0}")]
    ServiceError(String),

    #[error("malformed verification result: {0}")]
    MalformedResult(String),
}

/// Failure obtaining translated prose
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TranslationError {
    #[error("translation service error: {0}")]
    ServiceError(String),

    #[error("malformed translation result: {0}")]
    MalformedResult(String),
}

// =============================================================================
// Error Categories
// =============================================================================

/// Provider error categories for retry and mapping decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Rate limited - wait then retry
    RateLimit,
    /// Context/token limit exceeded
    TokenLimit,
    /// Authentication failed - fail fast
    Auth,
    /// Network/connectivity issues - retry with backoff
    Network,
    /// Provider unavailable
    Unavailable,
    /// Invalid request - don't retry
    BadRequest,
    /// Output refused by a safety or content filter
    Safety,
    /// Temporary server issues - retry
    Transient,
    /// Unknown error
    Unknown,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RateLimit => write!(f, "RATE_LIMIT"),
            Self::TokenLimit => write!(f, "TOKEN_LIMIT"),
            Self::Auth => write!(f, "AUTH"),
            Self::Network => write!(f, "NETWORK"),
            Self::Unavailable => write!(f, "UNAVAILABLE"),
            Self::BadRequest => write!(f, "BAD_REQUEST"),
            Self::Safety => write!(f, "SAFETY"),
            Self::Transient => write!(f, "TRANSIENT"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

impl ErrorCategory {
    /// Check if this category is worth retrying on the same provider
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimit | Self::Network | Self::Transient)
    }

    /// Get recommended retry delay for this category
    pub fn recommended_delay(&self) -> Duration {
        match self {
            Self::RateLimit => Duration::from_secs(30),
            Self::Network => Duration::from_secs(5),
            Self::Transient => Duration::from_secs(2),
            _ => Duration::from_millis(500),
        }
    }
}

// =============================================================================
// LLM Error
// =============================================================================

/// Provider error with category, context, and retry hints
#[derive(Debug, Clone)]
pub struct LlmError {
    pub category: ErrorCategory,
    pub message: String,
    pub provider: Option<String>,
    pub retry_after: Option<Duration>,
}

impl std::fmt::Display for LlmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(provider) = &self.provider {
            write!(f, "[{}:{}] {}", provider, self.category, self.message)
        } else {
            write!(f, "[{}] {}", self.category, self.message)
        }
    }
}

impl std::error::Error for LlmError {}

impl LlmError {
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            provider: None,
            retry_after: None,
        }
    }

    pub fn with_provider(
        category: ErrorCategory,
        message: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            category,
            message: message.into(),
            provider: Some(provider.into()),
            retry_after: None,
        }
    }

    pub fn retry_after(mut self, duration: Duration) -> Self {
        self.retry_after = Some(duration);
        self
    }

    pub fn is_retryable(&self) -> bool {
        self.category.is_retryable()
    }

    pub fn recommended_delay(&self) -> Duration {
        self.retry_after
            .unwrap_or_else(|| self.category.recommended_delay())
    }
}

// =============================================================================
// Error Classifier
// =============================================================================

/// Maps raw provider failures onto categories
pub struct ErrorClassifier;

impl ErrorClassifier {
    /// Classify an error message from any provider
    pub fn classify(message: &str, provider: &str) -> LlmError {
        let lower = message.to_lowercase();

        if lower.contains("content_filter")
            || lower.contains("safety")
            || lower.contains("blocked")
            || lower.contains("refused")
        {
            return LlmError::with_provider(ErrorCategory::Safety, message, provider);
        }

        if lower.contains("rate limit")
            || lower.contains("429")
            || lower.contains("too many requests")
            || lower.contains("quota exceeded")
        {
            return LlmError::with_provider(ErrorCategory::RateLimit, message, provider)
                .retry_after(Duration::from_secs(30));
        }

        if lower.contains("token")
            && (lower.contains("limit") || lower.contains("exceed") || lower.contains("maximum"))
            || lower.contains("context length")
            || lower.contains("too large")
        {
            return LlmError::with_provider(ErrorCategory::TokenLimit, message, provider);
        }

        if lower.contains("401")
            || lower.contains("403")
            || lower.contains("api key")
            || lower.contains("unauthorized")
            || lower.contains("permission denied")
        {
            return LlmError::with_provider(ErrorCategory::Auth, message, provider);
        }

        if lower.contains("network")
            || lower.contains("connection")
            || lower.contains("dns")
            || lower.contains("timeout")
            || lower.contains("timed out")
            || lower.contains("unreachable")
        {
            return LlmError::with_provider(ErrorCategory::Network, message, provider)
                .retry_after(Duration::from_secs(5));
        }

        if lower.contains("503")
            || lower.contains("502")
            || lower.contains("500")
            || lower.contains("service unavailable")
            || lower.contains("overloaded")
            || lower.contains("temporary")
            || lower.contains("non-zero status")
        {
            return LlmError::with_provider(ErrorCategory::Transient, message, provider)
                .retry_after(Duration::from_secs(2));
        }

        if lower.contains("not found") || lower.contains("not installed") {
            return LlmError::with_provider(ErrorCategory::Unavailable, message, provider);
        }

        if lower.contains("400") || lower.contains("bad request") || lower.contains("invalid") {
            return LlmError::with_provider(ErrorCategory::BadRequest, message, provider);
        }

        LlmError::with_provider(ErrorCategory::Unknown, message, provider)
    }

    /// Classify HTTP status code directly (more accurate than string matching)
    pub fn classify_http_status(status: u16, message: &str, provider: &str) -> LlmError {
        match status {
            429 => LlmError::with_provider(ErrorCategory::RateLimit, message, provider)
                .retry_after(Duration::from_secs(30)),
            401 | 403 => LlmError::with_provider(ErrorCategory::Auth, message, provider),
            400 => LlmError::with_provider(ErrorCategory::BadRequest, message, provider),
            500 | 502 | 503 | 504 => {
                LlmError::with_provider(ErrorCategory::Transient, message, provider)
                    .retry_after(Duration::from_secs(5))
            }
            404 => LlmError::with_provider(ErrorCategory::Unavailable, message, provider),
            _ => LlmError::with_provider(ErrorCategory::Unknown, message, provider),
        }
    }
}

// =============================================================================
// Application Error
// =============================================================================

#[derive(Debug, Error)]
pub enum DocError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("LLM error: {0}")]
    Llm(LlmError),

    #[error("Timeout after {duration:?}: {operation}")]
    Timeout {
        operation: String,
        duration: Duration,
    },

    #[error("Config error: {0}")]
    Config(String),

    #[error(transparent)]
    ContentFetch(#[from] ContentFetchError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Verification(#[from] VerificationError),

    #[error(transparent)]
    Translation(#[from] TranslationError),

    #[error("{path} has not been documented yet")]
    NotDocumented { path: String },

    #[error("{path} has no code examples to verify")]
    NothingToVerify { path: String },

    #[error("documentation for {path} changed while the request was in flight")]
    Superseded { path: String },

    #[error("'{language}' is not a two-letter language code")]
    UnsupportedLanguage { language: String },
}

impl From<LlmError> for DocError {
    fn from(err: LlmError) -> Self {
        DocError::Llm(err)
    }
}

pub type Result<T> = std::result::Result<T, DocError>;

impl DocError {
    pub fn timeout(operation: impl Into<String>, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Create an LLM error with category
    pub fn llm(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self::Llm(LlmError::new(category, message))
    }

    /// Check if this error is worth retrying
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Llm(e) => e.is_retryable(),
            Self::Timeout { .. } => true,
            _ => false,
        }
    }

    /// Collapse a provider-level failure into a generation failure.
    ///
    /// Safety refusals stay distinguishable; everything else, timeouts
    /// included, is a service error.
    pub fn into_generation_error(self) -> GenerationError {
        match self {
            Self::Generation(e) => e,
            Self::Llm(e) if e.category == ErrorCategory::Safety => {
                GenerationError::SafetyBlocked(e.message)
            }
            other => GenerationError::ServiceError(other.to_string()),
        }
    }

    pub fn into_verification_error(self) -> VerificationError {
        match self {
            Self::Verification(e) => e,
            other => VerificationError::ServiceError(other.to_string()),
        }
    }

    pub fn into_translation_error(self) -> TranslationError {
        match self {
            Self::Translation(e) => e,
            other => TranslationError::ServiceError(other.to_string()),
        }
    }
}
