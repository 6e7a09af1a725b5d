//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Supports global (~/.config/docsync/) and project (.docsync/) level configuration.

use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::ai::{ProviderConfig, ProviderKind};
use crate::constants::{documents, parser, workflow};
use crate::types::{DocError, Result};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// LLM provider settings
    pub llm: ProviderConfig,

    /// Where source files come from
    pub source: SourceConfig,

    /// Documentation workflow settings
    pub documentation: DocumentationConfig,

    /// Response parser settings
    pub parser: ParserConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            llm: ProviderConfig::default(),
            source: SourceConfig::default(),
            documentation: DocumentationConfig::default(),
            parser: ParserConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `DocError::Config` on validation failure.
    pub fn validate(&self) -> Result<()> {
        self.llm.provider.parse::<ProviderKind>()?;

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(DocError::Config(format!(
                "LLM temperature must be between 0.0 and 2.0, got {}",
                self.llm.temperature
            )));
        }

        if self.llm.timeout_secs == 0 {
            return Err(DocError::Config(
                "LLM timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.documentation.concurrency == 0 {
            return Err(DocError::Config(
                "Documentation concurrency must be greater than 0".to_string(),
            ));
        }

        if !is_language_code(&self.documentation.default_language) {
            return Err(DocError::Config(format!(
                "Default language must be a two-letter code, got '{}'",
                self.documentation.default_language
            )));
        }

        if self.source.kind == SourceKind::Github && self.source.repository.is_none() {
            return Err(DocError::Config(
                "GitHub source requires source.repository = \"owner/repo\"".to_string(),
            ));
        }

        Ok(())
    }
}

/// Two ASCII letters, e.g. "en", "fr"
pub fn is_language_code(code: &str) -> bool {
    code.len() == 2 && code.chars().all(|c| c.is_ascii_alphabetic())
}

// =============================================================================
// Source Configuration
// =============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Working tree on disk
    #[default]
    Local,
    /// GitHub repository over the REST API
    Github,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::Local => write!(f, "local"),
            SourceKind::Github => write!(f, "github"),
        }
    }
}

impl std::str::FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" => Ok(SourceKind::Local),
            "github" => Ok(SourceKind::Github),
            _ => Err(format!(
                "Unknown source kind: {}. Valid values: local, github",
                s
            )),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub kind: SourceKind,

    /// Root directory of a local source
    pub root: PathBuf,

    /// `owner/repo` of a GitHub source
    pub repository: Option<String>,

    /// Branch, tag or commit of a GitHub source
    pub branch: String,

    /// GitHub token; falls back to `GITHUB_TOKEN`
    #[serde(skip_serializing)]
    pub token: Option<String>,

    /// GitHub API base (GitHub Enterprise)
    pub api_base: Option<String>,
}

impl std::fmt::Debug for SourceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceConfig")
            .field("kind", &self.kind)
            .field("root", &self.root)
            .field("repository", &self.repository)
            .field("branch", &self.branch)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::Local,
            root: PathBuf::from("."),
            repository: None,
            branch: "main".to_string(),
            token: None,
            api_base: None,
        }
    }
}

impl SourceConfig {
    /// Configured token, else `GITHUB_TOKEN`
    pub fn resolved_token(&self) -> Option<String> {
        self.token
            .clone()
            .filter(|t| !t.is_empty())
            .or_else(|| env::var("GITHUB_TOKEN").ok().filter(|t| !t.is_empty()))
    }
}

// =============================================================================
// Documentation Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentationConfig {
    /// Language shown when none is requested
    pub default_language: String,

    /// Source characters included in prompts
    pub max_file_chars: usize,

    /// Paths documented in parallel by batch runs
    pub concurrency: usize,

    /// Documentable file extensions
    pub extensions: Vec<String>,
}

impl Default for DocumentationConfig {
    fn default() -> Self {
        Self {
            default_language: documents::BASE_LANGUAGE.to_string(),
            max_file_chars: workflow::DEFAULT_MAX_FILE_CHARS,
            concurrency: workflow::DEFAULT_CONCURRENCY,
            extensions: workflow::DEFAULT_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        }
    }
}

// =============================================================================
// Parser Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Characters kept by the raw fallback tier
    pub raw_fallback_limit: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            raw_fallback_limit: parser::RAW_FALLBACK_LIMIT,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
