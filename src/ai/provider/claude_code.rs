//! Claude Code CLI backend
//!
//! Runs `claude -p --output-format json` with the prompt on stdin and reads
//! the `result` text out of the JSON envelope it prints.
//!
//! Retries are handled by `RetryingProvider`; this provider runs the CLI once.

use async_trait::async_trait;
use serde_json::Value;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use super::chat::SYSTEM_PROMPT;
use super::{LlmProvider, LlmResponse, ProviderConfig, TokenUsage};
use crate::types::{DocError, ErrorCategory, ErrorClassifier, LlmError, Result};

const PROVIDER: &str = "claude-code";
const BINARY: &str = "claude";
const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

pub struct ClaudeCodeProvider {
    model: String,
    timeout: Duration,
}

impl ClaudeCodeProvider {
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            model: config.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(BINARY);
        cmd.args(["-p", "--output-format", "json", "--model"])
            .arg(&self.model)
            .arg("--append-system-prompt")
            .arg(SYSTEM_PROMPT)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    async fn run(&self, prompt: &str) -> Result<std::process::Output> {
        let mut child = self.command().spawn().map_err(|e| {
            LlmError::with_provider(
                ErrorCategory::Unavailable,
                format!("Could not start `{}` ({}). Is Claude Code installed?", BINARY, e),
                PROVIDER,
            )
        })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(prompt.as_bytes()).await?;
            // EOF tells the CLI the prompt is complete
            drop(stdin);
        }

        tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| DocError::timeout("Claude Code CLI", self.timeout))?
            .map_err(|e| {
                ErrorClassifier::classify(&format!("Claude Code execution failed: {}", e), PROVIDER)
                    .into()
            })
    }

    /// Reply text of a successful run, or the categorized failure
    fn read_envelope(status_ok: bool, stdout: &str, stderr: &str) -> Result<(String, TokenUsage)> {
        let envelope: Option<Value> = serde_json::from_str(stdout).ok();

        if let Some(message) = envelope.as_ref().and_then(Self::api_error) {
            return Err(ErrorClassifier::classify(&message, PROVIDER).into());
        }
        if !status_ok {
            let detail = if stderr.trim().is_empty() {
                "process exited with non-zero status"
            } else {
                stderr.trim()
            };
            return Err(
                ErrorClassifier::classify(&format!("Claude Code failed: {}", detail), PROVIDER)
                    .into(),
            );
        }

        let envelope = envelope.ok_or_else(|| {
            LlmError::with_provider(
                ErrorCategory::Unknown,
                "Claude Code printed something other than a JSON envelope",
                PROVIDER,
            )
        })?;
        let content = Self::result_text(&envelope).ok_or_else(|| {
            LlmError::with_provider(ErrorCategory::Unknown, "Envelope has no result", PROVIDER)
        })?;

        Ok((content, Self::usage(&envelope)))
    }

    /// Message of an `is_error` envelope
    fn api_error(envelope: &Value) -> Option<String> {
        if !envelope.get("is_error")?.as_bool()? {
            return None;
        }
        Some(
            envelope
                .get("result")
                .and_then(Value::as_str)
                .unwrap_or("Unknown API error")
                .to_string(),
        )
    }

    /// Structured results are re-serialized so the parser sees JSON text
    fn result_text(envelope: &Value) -> Option<String> {
        match envelope.get("result")? {
            Value::String(s) => Some(s.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }

    fn usage(envelope: &Value) -> TokenUsage {
        let count = |key: &str| {
            envelope
                .pointer(&format!("/usage/{}", key))
                .and_then(Value::as_u64)
                .map_or(0, |n| u32::try_from(n).unwrap_or(u32::MAX))
        };
        TokenUsage::new(count("input_tokens"), count("output_tokens"))
    }
}

#[async_trait]
impl LlmProvider for ClaudeCodeProvider {
    async fn complete(&self, prompt: &str) -> Result<LlmResponse> {
        let started = Instant::now();
        debug!(model = %self.model, prompt_chars = prompt.len(), "Claude Code completion");

        let output = self.run(prompt).await?;
        let (content, usage) = Self::read_envelope(
            output.status.success(),
            &String::from_utf8_lossy(&output.stdout),
            &String::from_utf8_lossy(&output.stderr),
        )?;

        Ok(LlmResponse::new(content, &self.model, usage, started.elapsed()))
    }

    fn name(&self) -> &str {
        PROVIDER
    }

    fn model(&self) -> &str {
        &self.model
    }
}
