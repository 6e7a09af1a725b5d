//! OpenAI-compatible chat completions backend.
//!
//! Works against api.openai.com or any endpoint speaking the same protocol
//! (set `llm.api_base`). JSON mode is requested so replies start out as an
//! object, though the parser never relies on it.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use super::chat::{self, ChatMessage};
use super::{LlmProvider, LlmResponse, ProviderConfig, TokenUsage};
use crate::types::{DocError, ErrorCategory, LlmError, Result};

const PROVIDER: &str = "openai";
const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const API_KEY_ENV: &str = "OPENAI_API_KEY";

pub struct OpenAiProvider {
    api_key: SecretString,
    endpoint: String,
    model: String,
    temperature: f32,
    max_tokens: usize,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl OpenAiProvider {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                DocError::Config(format!(
                    "OpenAI API key missing: set {} or llm.api_key",
                    API_KEY_ENV
                ))
            })?;

        let api_base = chat::normalize_api_base(
            config.api_base.as_deref().unwrap_or(DEFAULT_API_BASE),
            PROVIDER,
        )?;

        Ok(Self {
            api_key: SecretString::from(api_key),
            endpoint: format!("{}/chat/completions", api_base),
            model: config.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            client: chat::http_client(config.timeout_secs)?,
        })
    }

    fn build_request(&self, prompt: &str) -> CompletionRequest<'_> {
        CompletionRequest {
            model: &self.model,
            messages: chat::chat_messages(prompt),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            response_format: JsonMode { kind: "json_object" },
        }
    }

    fn usage(body: &CompletionResponse) -> TokenUsage {
        body.usage
            .as_ref()
            .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default()
    }

    /// Reply text of the first choice; a content-filter stop is a safety refusal
    fn reply_text(body: CompletionResponse) -> Result<String> {
        let choice = body.choices.into_iter().next().ok_or_else(|| {
            LlmError::with_provider(ErrorCategory::Unknown, "Reply had no choices", PROVIDER)
        })?;

        if choice.finish_reason.as_deref() == Some("content_filter") {
            return Err(LlmError::with_provider(
                ErrorCategory::Safety,
                "Reply blocked by content filter",
                PROVIDER,
            )
            .into());
        }

        choice.message.content.ok_or_else(|| {
            LlmError::with_provider(ErrorCategory::Unknown, "Reply had no content", PROVIDER)
                .into()
        })
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn complete(&self, prompt: &str) -> Result<LlmResponse> {
        let started = Instant::now();
        debug!(model = %self.model, prompt_chars = prompt.len(), "OpenAI completion");

        let request = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose_secret())
            .json(&self.build_request(prompt));
        let body: CompletionResponse = chat::send_json(request, PROVIDER).await?;

        let usage = Self::usage(&body);
        let model = body.model.clone().unwrap_or_else(|| self.model.clone());
        let content = Self::reply_text(body)?;

        Ok(LlmResponse::new(content, &model, usage, started.elapsed()))
    }

    fn name(&self) -> &str {
        PROVIDER
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: usize,
    response_format: JsonMode,
}

#[derive(Debug, Serialize)]
struct JsonMode {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    model: Option<String>,
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ReplyMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> OpenAiProvider {
        OpenAiProvider::new(ProviderConfig {
            provider: PROVIDER.to_string(),
            api_key: Some("sk-test".to_string()),
            api_base: Some("https://llm.internal.example/v1/".to_string()),
            ..Default::default()
        })
        .unwrap()
    }

    fn parse(body: &str) -> CompletionResponse {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn test_endpoint_and_debug() {
        let provider = provider();
        assert_eq!(
            provider.endpoint,
            "https://llm.internal.example/v1/chat/completions"
        );
        let debug = format!("{:?}", provider);
        assert!(!debug.contains("sk-test"));
    }

    #[test]
    fn test_request_shape() {
        let provider = provider();
        let value = serde_json::to_value(provider.build_request("Document a.rs")).unwrap();
        assert_eq!(value["model"], DEFAULT_MODEL);
        assert_eq!(value["messages"][1]["content"], "Document a.rs");
        assert_eq!(value["response_format"]["type"], "json_object");
    }

    #[test]
    fn test_reply_text() {
        let body = parse(
            r#"{"choices": [{"message": {"content": "{\"a\": 1}"}, "finish_reason": "stop"}],
                "usage": {"prompt_tokens": 10, "completion_tokens": 4}}"#,
        );
        assert_eq!(OpenAiProvider::usage(&body), TokenUsage::new(10, 4));
        assert_eq!(OpenAiProvider::reply_text(body).unwrap(), "{\"a\": 1}");
    }

    #[test]
    fn test_missing_usage_is_zero() {
        let body = parse(r#"{"choices": [{"message": {"content": "{}"}}]}"#);
        assert_eq!(OpenAiProvider::usage(&body).total(), 0);
        assert_eq!(OpenAiProvider::reply_text(body).unwrap(), "{}");
    }

    #[test]
    fn test_content_filter_is_safety() {
        let body = parse(
            r#"{"choices": [{"message": {"content": null}, "finish_reason": "content_filter"}]}"#,
        );
        match OpenAiProvider::reply_text(body) {
            Err(DocError::Llm(e)) => assert_eq!(e.category, ErrorCategory::Safety),
            other => panic!("expected safety error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_choices() {
        assert!(OpenAiProvider::reply_text(parse(r#"{"choices": []}"#)).is_err());
    }

    #[test]
    fn test_blank_key_rejected() {
        let config = ProviderConfig {
            provider: PROVIDER.to_string(),
            api_key: Some("  ".to_string()),
            ..Default::default()
        };
        // only meaningful when the environment has no key
        if std::env::var(API_KEY_ENV).is_err() {
            assert!(matches!(
                OpenAiProvider::new(config),
                Err(DocError::Config(_))
            ));
        }
    }
}
