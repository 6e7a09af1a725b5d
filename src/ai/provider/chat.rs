//! Shared plumbing for HTTP chat backends (OpenAI-compatible, Ollama).

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::types::{DocError, ErrorCategory, ErrorClassifier, LlmError, Result};

/// System prompt sent ahead of every documentation, verification or
/// translation request
pub const SYSTEM_PROMPT: &str = "You are a meticulous source code documentation assistant. \
Reply with exactly one JSON object and nothing else.";

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

/// System prompt followed by the user prompt
pub fn chat_messages(prompt: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage {
            role: "system",
            content: SYSTEM_PROMPT.to_string(),
        },
        ChatMessage {
            role: "user",
            content: prompt.to_string(),
        },
    ]
}

/// Parse and normalize an API base URL.
///
/// Only http(s) is accepted. Plain http to a remote host is allowed but
/// logged, since prompts carry source code.
pub fn normalize_api_base(raw: &str, provider: &str) -> Result<String> {
    let url = url::Url::parse(raw)
        .map_err(|e| DocError::Config(format!("Invalid {} endpoint '{}': {}", provider, raw, e)))?;

    match url.scheme() {
        "https" => {}
        "http" => {
            if let Some(host) = url.host_str()
                && !matches!(host, "localhost" | "127.0.0.1" | "[::1]" | "::1")
            {
                warn!(provider, host, "Sending source code over plain http");
            }
        }
        other => {
            return Err(DocError::Config(format!(
                "{} endpoint must use http or https, got '{}'",
                provider, other
            )));
        }
    }

    Ok(url.as_str().trim_end_matches('/').to_string())
}

pub fn http_client(timeout_secs: u64) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| DocError::Config(format!("Failed to create HTTP client: {}", e)))
}

/// Send a prepared request and decode its JSON body.
///
/// Transport failures and non-2xx statuses become categorized `LlmError`s.
pub async fn send_json<T: DeserializeOwned>(
    request: reqwest::RequestBuilder,
    provider: &str,
) -> Result<T> {
    let response = request.send().await.map_err(|e| {
        if e.is_connect() {
            LlmError::with_provider(
                ErrorCategory::Network,
                format!("Could not connect to {}: {}", provider, e),
                provider,
            )
        } else {
            ErrorClassifier::classify(&format!("{} request failed: {}", provider, e), provider)
        }
    })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ErrorClassifier::classify_http_status(
            status.as_u16(),
            &format!("{} API error ({}): {}", provider, status, body),
            provider,
        )
        .into());
    }

    response.json::<T>().await.map_err(|e| {
        LlmError::with_provider(
            ErrorCategory::Unknown,
            format!("Unreadable {} response: {}", provider, e),
            provider,
        )
        .into()
    })
}
