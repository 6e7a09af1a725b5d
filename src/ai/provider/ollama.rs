//! Ollama backend using the `/api/chat` endpoint in JSON mode.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use super::chat::{self, ChatMessage};
use super::{LlmProvider, LlmResponse, ProviderConfig, TokenUsage};
use crate::types::Result;

const PROVIDER: &str = "ollama";
const DEFAULT_API_BASE: &str = "http://localhost:11434";
const DEFAULT_MODEL: &str = "llama3:latest";

pub struct OllamaProvider {
    endpoint: String,
    model: String,
    options: ChatOptions,
    client: reqwest::Client,
}

impl OllamaProvider {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let api_base = chat::normalize_api_base(
            config.api_base.as_deref().unwrap_or(DEFAULT_API_BASE),
            PROVIDER,
        )?;

        Ok(Self {
            endpoint: format!("{}/api/chat", api_base),
            model: config.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            options: ChatOptions {
                temperature: config.temperature,
                num_predict: config.max_tokens,
            },
            client: chat::http_client(config.timeout_secs)?,
        })
    }

    fn build_request(&self, prompt: &str) -> ChatRequest<'_> {
        ChatRequest {
            model: &self.model,
            messages: chat::chat_messages(prompt),
            stream: false,
            format: "json",
            options: &self.options,
        }
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    async fn complete(&self, prompt: &str) -> Result<LlmResponse> {
        let started = Instant::now();
        debug!(model = %self.model, endpoint = %self.endpoint, "Ollama completion");

        let request = self.client.post(&self.endpoint).json(&self.build_request(prompt));
        let body: ChatResponse = chat::send_json(request, PROVIDER).await?;

        let usage = TokenUsage::new(
            body.prompt_eval_count.unwrap_or(0),
            body.eval_count.unwrap_or(0),
        );
        Ok(LlmResponse::new(
            body.message.content,
            &self.model,
            usage,
            started.elapsed(),
        ))
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
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    stream: bool,
    format: &'static str,
    options: &'a ChatOptions,
}

#[derive(Debug, Serialize)]
struct ChatOptions {
    temperature: f32,
    num_predict: usize,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ReplyMessage,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: String,
}
