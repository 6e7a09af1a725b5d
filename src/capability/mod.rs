//! External Collaborator Contracts
//!
//! The orchestrator only talks to the outside world through these four
//! traits. Each method fails with the typed error of its collaborator, and
//! every failure is scoped to the single request that caused it.
//!
//! | Trait | Implementations |
//! |-------|-----------------|
//! | `ContentSource` | `source::LocalContentSource`, `source::GitHubContentSource` |
//! | `DocumentationGenerator` | `LlmDocumentationGenerator` |
//! | `VerificationOracle` | `LlmVerificationOracle` |
//! | `Translator` | `LlmTranslator` |

mod llm;

pub use llm::{LlmDocumentationGenerator, LlmTranslator, LlmVerificationOracle};

use std::sync::Arc;

use async_trait::async_trait;

use crate::types::{
    ContentFetchError, Fingerprint, GenerationError, SectionText, TranslationError,
    VerificationError,
};

/// Read access to source files and their revision identifiers
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn fetch_fingerprint(&self, path: &str) -> Result<Fingerprint, ContentFetchError>;

    async fn fetch_content(&self, path: &str) -> Result<String, ContentFetchError>;

    /// Every file path in the source, unfiltered
    async fn list_files(&self) -> Result<Vec<String>, ContentFetchError>;

    /// Human-readable location, for logs and CLI output
    fn describe(&self) -> String;
}

/// Produces raw documentation text for one file
#[async_trait]
pub trait DocumentationGenerator: Send + Sync {
    async fn generate(&self, file_name: &str, content: &str) -> Result<String, GenerationError>;
}

/// Checks documented example code against its source; returns the raw reply
#[async_trait]
pub trait VerificationOracle: Send + Sync {
    async fn verify(
        &self,
        file_name: &str,
        source: &str,
        example: &str,
    ) -> Result<String, VerificationError>;
}

/// Prose sent for translation. Code examples are never part of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRequest {
    pub language: String,
    pub summary: String,
    pub sections: Vec<SectionText>,
}

/// Translates documentation prose; returns the raw reply
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, request: &TranslationRequest) -> Result<String, TranslationError>;
}

pub type SharedContentSource = Arc<dyn ContentSource>;
pub type SharedGenerator = Arc<dyn DocumentationGenerator>;
pub type SharedOracle = Arc<dyn VerificationOracle>;
pub type SharedTranslator = Arc<dyn Translator>;
