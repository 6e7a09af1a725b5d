//! LLM-backed capabilities
//!
//! Each capability builds its prompt, calls the shared provider under a
//! timeout and hands back the reply text untouched. Provider failures are
//! collapsed into the capability's own error type.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::{DocumentationGenerator, TranslationRequest, Translator, VerificationOracle};
use crate::ai::{PromptTemplates, SharedProvider, with_timeout};
use crate::types::{
    DocError, GenerationError, TranslationError, VerificationError, truncate_for_prompt,
};

async fn complete(
    provider: &SharedProvider,
    prompt: &str,
    timeout: Duration,
    operation: &str,
) -> Result<String, DocError> {
    let response = with_timeout(timeout, provider.complete(prompt), operation).await?;
    debug!(
        provider = provider.name(),
        model = %response.model,
        tokens = response.usage.total(),
        elapsed_ms = response.elapsed.as_millis() as u64,
        "{} finished",
        operation
    );
    Ok(response.content)
}

// =============================================================================
// Documentation
// =============================================================================

pub struct LlmDocumentationGenerator {
    provider: SharedProvider,
    timeout: Duration,
    max_file_chars: usize,
}

impl LlmDocumentationGenerator {
    pub fn new(provider: SharedProvider, timeout: Duration, max_file_chars: usize) -> Self {
        Self {
            provider,
            timeout,
            max_file_chars,
        }
    }
}

#[async_trait]
impl DocumentationGenerator for LlmDocumentationGenerator {
    async fn generate(&self, file_name: &str, content: &str) -> Result<String, GenerationError> {
        let content = truncate_for_prompt(content, self.max_file_chars);
        let prompt = PromptTemplates::documentation(file_name, &content);

        complete(&self.provider, &prompt, self.timeout, "documentation generation")
            .await
            .map_err(DocError::into_generation_error)
    }
}

// =============================================================================
// Verification
// =============================================================================

pub struct LlmVerificationOracle {
    provider: SharedProvider,
    timeout: Duration,
    max_file_chars: usize,
}

impl LlmVerificationOracle {
    pub fn new(provider: SharedProvider, timeout: Duration, max_file_chars: usize) -> Self {
        Self {
            provider,
            timeout,
            max_file_chars,
        }
    }
}

#[async_trait]
impl VerificationOracle for LlmVerificationOracle {
    async fn verify(
        &self,
        file_name: &str,
        source: &str,
        example: &str,
    ) -> Result<String, VerificationError> {
        let source = truncate_for_prompt(source, self.max_file_chars);
        let prompt = PromptTemplates::verification(file_name, &source, example);

        complete(&self.provider, &prompt, self.timeout, "example verification")
            .await
            .map_err(DocError::into_verification_error)
    }
}

// =============================================================================
// Translation
// =============================================================================

pub struct LlmTranslator {
    provider: SharedProvider,
    timeout: Duration,
}

impl LlmTranslator {
    pub fn new(provider: SharedProvider, timeout: Duration) -> Self {
        Self { provider, timeout }
    }
}

#[async_trait]
impl Translator for LlmTranslator {
    async fn translate(&self, request: &TranslationRequest) -> Result<String, TranslationError> {
        let prompt =
            PromptTemplates::translation(&request.language, &request.summary, &request.sections);

        complete(&self.provider, &prompt, self.timeout, "translation")
            .await
            .map_err(DocError::into_translation_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{LlmProvider, LlmResponse};
    use crate::types::{ErrorCategory, Result, SectionText};
    use std::sync::{Arc, Mutex};

    /// Records prompts and replies with a fixed result
    struct ScriptedProvider {
        reply: std::result::Result<String, ErrorCategory>,
        delay: Duration,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedProvider {
        fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(reply.to_string()),
                delay: Duration::ZERO,
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn failing(category: ErrorCategory) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(category),
                delay: Duration::ZERO,
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        async fn complete(&self, prompt: &str) -> Result<LlmResponse> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            tokio::time::sleep(self.delay).await;
            match &self.reply {
                Ok(text) => Ok(LlmResponse::text(text.clone())),
                Err(category) => Err(DocError::llm(*category, "scripted failure")),
            }
        }

        fn name(&self) -> &str {
            "scripted"
        }

        fn model(&self) -> &str {
            "test"
        }
    }

    #[tokio::test]
    async fn test_generator_returns_raw_reply() {
        let provider = ScriptedProvider::replying("not even json");
        let generator =
            LlmDocumentationGenerator::new(provider.clone(), Duration::from_secs(5), 100);

        let reply = generator.generate("a.rs", "fn a() {}").await.unwrap();
        assert_eq!(reply, "not even json");
        assert!(provider.prompts.lock().unwrap()[0].contains("fn a() {}"));
    }

    #[tokio::test]
    async fn test_generator_truncates_source() {
        let provider = ScriptedProvider::replying("{}");
        let generator = LlmDocumentationGenerator::new(provider.clone(), Duration::from_secs(5), 10);

        let source = "line one\n".repeat(50);
        generator.generate("a.rs", &source).await.unwrap();
        assert!(provider.prompts.lock().unwrap()[0].contains("[truncated]"));
    }

    #[tokio::test]
    async fn test_generator_safety_is_blocked() {
        let generator = LlmDocumentationGenerator::new(
            ScriptedProvider::failing(ErrorCategory::Safety),
            Duration::from_secs(5),
            100,
        );

        let err = generator.generate("a.rs", "x").await.unwrap_err();
        assert!(matches!(err, GenerationError::SafetyBlocked(_)));
    }

    #[tokio::test]
    async fn test_generator_timeout_is_service_error() {
        let provider = Arc::new(ScriptedProvider {
            reply: Ok("{}".to_string()),
            delay: Duration::from_secs(5),
            prompts: Mutex::new(Vec::new()),
        });
        let generator = LlmDocumentationGenerator::new(provider, Duration::from_millis(10), 100);

        let err = generator.generate("a.rs", "x").await.unwrap_err();
        assert!(matches!(err, GenerationError::ServiceError(_)));
    }

    #[tokio::test]
    async fn test_oracle_and_translator_map_errors() {
        let oracle = LlmVerificationOracle::new(
            ScriptedProvider::failing(ErrorCategory::Network),
            Duration::from_secs(5),
            100,
        );
        assert!(matches!(
            oracle.verify("a.rs", "src", "ex").await,
            Err(VerificationError::ServiceError(_))
        ));

        let translator = LlmTranslator::new(
            ScriptedProvider::failing(ErrorCategory::Auth),
            Duration::from_secs(5),
        );
        let request = TranslationRequest {
            language: "fr".to_string(),
            summary: "s".to_string(),
            sections: vec![SectionText {
                title: "t".to_string(),
                content: "c".to_string(),
            }],
        };
        assert!(matches!(
            translator.translate(&request).await,
            Err(TranslationError::ServiceError(_))
        ));
    }
}
