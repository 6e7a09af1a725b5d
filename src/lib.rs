//! docsync - LLM-Generated Source Documentation
//!
//! Generates structured documentation for source files with an LLM and keeps
//! it synchronized with the file content, its verification result and its
//! translations.
//!
//! ## Core Features
//!
//! - **Resilient Parsing**: any LLM reply becomes a valid `Document`, tagged
//!   with a `QualityTier` (strict, recovered, raw fallback)
//! - **Versioned Caches**: canonical documents keyed by content fingerprint,
//!   translated overlays tied to the canonical revision
//! - **Single-Flight Requests**: one generation, verification or translation
//!   per key at a time; stale replies never overwrite newer content
//! - **Sources**: local working tree or GitHub repository
//! - **Providers**: Claude Code CLI, OpenAI-compatible APIs, Ollama
//!
//! ## Quick Start
//!
//! ```ignore
//! use docsync::cli::{build_orchestrator, build_source};
//! use docsync::{Config, create_provider};
//!
//! let config = Config::default();
//! let source = build_source(&config)?;
//! let provider = create_provider(&config.llm)?;
//! let orchestrator = build_orchestrator(&config, source, provider);
//!
//! let outcome = orchestrator.ensure_documented("src/lib.rs").await?;
//! let record = orchestrator.request_verification("src/lib.rs").await?;
//! let french = orchestrator.request_translation("src/lib.rs", "fr").await?;
//! ```
//!
//! ## Modules
//!
//! - [`types`]: documents, verification records, errors
//! - [`ai`]: LLM providers, prompts, resilient parser
//! - [`capability`]: collaborator traits and LLM-backed implementations
//! - [`source`]: local and GitHub content sources
//! - [`store`]: canonical document store and overlay cache
//! - [`orchestrator`]: request workflows over the caches
//! - [`config`]: layered configuration

pub mod ai;
pub mod capability;
pub mod cli;
pub mod config;
pub mod constants;
pub mod orchestrator;
pub mod source;
pub mod store;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{Config, ConfigLoader};

// Types
pub use types::{
    Document, Fingerprint, QualityTier, Section, VerificationRecord, VerificationStatus,
};

// Error Types
pub use types::error::{
    ContentFetchError, DocError, ErrorCategory, GenerationError, Result, TranslationError,
    VerificationError,
};

// =============================================================================
// Pipeline Re-exports
// =============================================================================

pub use capability::{ContentSource, DocumentationGenerator, Translator, VerificationOracle};
pub use orchestrator::{
    DocumentView, EnsureOutcome, Orchestrator, TranslationOutcome, TranslationStatus,
};
pub use store::{DocumentStore, OverlayCache};

// =============================================================================
// AI Re-exports
// =============================================================================

pub use ai::{
    LlmProvider, LlmResponse, ProviderConfig, ResilientParser, SharedProvider, create_provider,
    parse_document, with_timeout,
};

// =============================================================================
// Source Re-exports
// =============================================================================

pub use source::{GitHubContentSource, LocalContentSource};
