//! What a caller displays for one (path, language) selection

use serde::Serialize;

use crate::types::{Document, QualityTier, TranslationError, VerificationRecord};

/// Display snapshot of one document.
///
/// `verification` always comes from the canonical entry, even when
/// `document` is a translated overlay.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentView {
    pub document: Document,
    pub verification: VerificationRecord,
    pub tier: QualityTier,
    /// Language that was asked for
    pub language: String,
    /// The requested language has no current overlay; `document` is the base
    pub is_fallback: bool,
}

/// Result of `ensure_documented`
#[derive(Debug, Clone)]
pub struct EnsureOutcome {
    pub view: DocumentView,
    /// False when the cached document was still fresh
    pub generated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationStatus {
    /// A new overlay was stored
    Translated,
    /// A current overlay already existed
    CacheHit,
    /// The base language needs no translation
    BaseLanguage,
    /// The translator failed; the base document is shown instead
    Fallback(TranslationError),
    /// The canonical document changed while translating; nothing was stored
    Superseded,
}

impl TranslationStatus {
    pub fn is_translated(&self) -> bool {
        matches!(self, Self::Translated | Self::CacheHit)
    }
}

/// Result of `request_translation`
#[derive(Debug, Clone)]
pub struct TranslationOutcome {
    pub view: DocumentView,
    pub status: TranslationStatus,
}
