//! Documentation Value Types
//!
//! Shared values flowing between the parser, the caches and the orchestrator.
//! No behavior beyond construction helpers and small invariants.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::documents;

// =============================================================================
// Fingerprint
// =============================================================================

/// Opaque content identifier for one revision of a source file.
///
/// Compared for equality only; the value is whatever the content source
/// exposes (a blob sha, a SHA-256 of the bytes, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for the placeholder carried by freshly parsed documents
    pub fn is_unset(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Fingerprint {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Fingerprint {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

// =============================================================================
// Document
// =============================================================================

/// One titled block of documentation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_example: Option<String>,
}

impl Section {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            code_example: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        let code = code.into();
        self.code_example = (!code.is_empty()).then_some(code);
        self
    }

    /// Code example if present and non-empty
    pub fn code(&self) -> Option<&str> {
        self.code_example.as_deref().filter(|c| !c.is_empty())
    }
}

/// Structured documentation for a single source file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub file_path: String,
    pub summary: String,
    #[serde(default)]
    pub sections: Vec<Section>,
    pub language: String,
    #[serde(default)]
    pub source_fingerprint: Fingerprint,
}

impl Document {
    /// Canonical (base-language) document with no fingerprint yet
    pub fn new(file_path: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            summary: summary.into(),
            sections: Vec::new(),
            language: documents::BASE_LANGUAGE.to_string(),
            source_fingerprint: Fingerprint::default(),
        }
    }

    pub fn with_sections(mut self, sections: Vec<Section>) -> Self {
        self.sections = sections;
        self
    }

    /// All non-empty code examples, in section order
    pub fn code_examples(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().filter_map(Section::code)
    }

    pub fn has_code_examples(&self) -> bool {
        self.code_examples().next().is_some()
    }

    /// Prose-only view used as translator input
    pub fn prose(&self) -> Vec<SectionText> {
        self.sections
            .iter()
            .map(|s| SectionText {
                title: s.title.clone(),
                content: s.content.clone(),
            })
            .collect()
    }

    /// Build a translated overlay from this canonical document.
    ///
    /// Code examples, path and fingerprint always come from `self`. Sections
    /// are matched by index; a missing translated entry or field keeps the
    /// base prose.
    pub fn overlay(&self, language: &str, translated: &TranslatedFields) -> Document {
        let sections = self
            .sections
            .iter()
            .enumerate()
            .map(|(idx, base)| match translated.sections.get(idx) {
                Some(text) => Section {
                    title: text.title.clone().unwrap_or_else(|| base.title.clone()),
                    content: text.content.clone().unwrap_or_else(|| base.content.clone()),
                    code_example: base.code_example.clone(),
                },
                None => base.clone(),
            })
            .collect();

        Document {
            file_path: self.file_path.clone(),
            summary: translated.summary.clone(),
            sections,
            language: language.to_string(),
            source_fingerprint: self.source_fingerprint.clone(),
        }
    }
}

/// Title and prose of a section, without its code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionText {
    pub title: String,
    pub content: String,
}

/// One translated section; `None` where the translator gave no usable text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslatedSection {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl TranslatedSection {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            content: Some(content.into()),
        }
    }
}

/// Prose fields returned by a translator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslatedFields {
    pub summary: String,
    pub sections: Vec<TranslatedSection>,
}

// =============================================================================
// Verification
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    #[default]
    Idle,
    Pending,
    Success,
    Failed,
}

impl VerificationStatus {
    /// Parse an oracle verdict. Only terminal verdicts are accepted.
    pub fn parse_verdict(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "success" => Some(Self::Success),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Pending => write!(f, "pending"),
            Self::Success => write!(f, "success"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Result of checking a document's code examples against its source.
///
/// Attached to the canonical document; overlays carry a synchronized copy.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationRecord {
    pub status: VerificationStatus,
    #[serde(default)]
    pub logs: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_code: Option<String>,
}

impl VerificationRecord {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn pending() -> Self {
        Self {
            status: VerificationStatus::Pending,
            logs: documents::VERIFICATION_PENDING_LOG.to_string(),
            fixed_code: None,
        }
    }

    /// Record left behind after a fix replaced the code examples
    pub fn after_fix() -> Self {
        Self {
            status: VerificationStatus::Idle,
            logs: documents::FIX_APPLIED_LOG.to_string(),
            fixed_code: None,
        }
    }
}

// =============================================================================
// Quality Tier
// =============================================================================

/// How much repair or guessing produced a parsed document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityTier {
    /// Parsed as JSON, possibly after syntactic repair
    Strict,
    /// Fields scavenged from malformed output
    Recovered,
    /// Raw text wrapped as a single section
    RawFallback,
}

impl QualityTier {
    pub fn is_degraded(&self) -> bool {
        !matches!(self, Self::Strict)
    }
}

impl fmt::Display for QualityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strict => write!(f, "strict"),
            Self::Recovered => write!(f, "recovered"),
            Self::RawFallback => write!(f, "raw_fallback"),
        }
    }
}
