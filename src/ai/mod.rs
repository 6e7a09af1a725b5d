//! AI Integration Layer
//!
//! LLM providers, prompt templates and the resilient response parser.

pub mod prompt;
pub mod provider;
pub mod timeout;
pub mod validation;

pub use prompt::{PromptBuilder, PromptSection, PromptTemplates};
pub use provider::{
    ClaudeCodeProvider, ErrorCategory, ErrorClassifier, LlmError, LlmProvider, LlmResponse,
    OllamaProvider, OpenAiProvider, ProviderConfig, ProviderKind, RetryingProvider,
    SharedProvider, TokenUsage, create_provider,
};
pub use timeout::with_timeout;
pub use validation::{
    JsonRepairer, ResilientParser, decode_translation, decode_verification, parse_document,
};
