//! Translated overlay cache
//!
//! Derived per-language copies of canonical documents, keyed by path and
//! then language so a whole path can be evicted or refreshed at once.
//! Overlays are never a source of truth: their verification record is a copy
//! of the canonical one, and `base_revision` ties each overlay to the
//! canonical revision it was translated from.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::debug;

use crate::types::{Document, VerificationRecord};

#[derive(Debug, Clone)]
pub struct OverlayEntry {
    pub document: Document,
    pub verification: VerificationRecord,
    /// Canonical revision the translation was made from
    pub base_revision: u64,
    pub translated_at: DateTime<Utc>,
}

/// Thread-safe cache of translated documents keyed by (path, language)
#[derive(Default)]
pub struct OverlayCache {
    entries: DashMap<String, HashMap<String, OverlayEntry>>,
}

impl OverlayCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str, language: &str) -> Option<Document> {
        self.entry(path, language).map(|e| e.document)
    }

    pub fn entry(&self, path: &str, language: &str) -> Option<OverlayEntry> {
        self.entries
            .get(path)
            .and_then(|langs| langs.get(language).cloned())
    }

    pub fn put(
        &self,
        path: &str,
        language: &str,
        document: Document,
        verification: VerificationRecord,
        base_revision: u64,
    ) {
        self.entries.entry(path.to_string()).or_default().insert(
            language.to_string(),
            OverlayEntry {
                document,
                verification,
                base_revision,
                translated_at: Utc::now(),
            },
        );
        debug!(path, language, base_revision, "Stored translated overlay");
    }

    /// Evict every overlay of `path`. Returns how many were removed.
    pub fn invalidate_path(&self, path: &str) -> usize {
        let removed = self
            .entries
            .remove(path)
            .map(|(_, langs)| langs.len())
            .unwrap_or(0);
        if removed > 0 {
            debug!(path, removed, "Invalidated translated overlays");
        }
        removed
    }

    /// Copy `record` into every overlay of `path`, leaving prose untouched.
    /// Returns how many overlays were updated.
    pub fn refresh_verification(&self, path: &str, record: &VerificationRecord) -> usize {
        let Some(mut langs) = self.entries.get_mut(path) else {
            return 0;
        };
        for entry in langs.values_mut() {
            entry.verification = record.clone();
        }
        langs.len()
    }

    /// Cached languages for `path`, sorted
    pub fn languages(&self, path: &str) -> Vec<String> {
        let mut languages: Vec<String> = self
            .entries
            .get(path)
            .map(|langs| langs.keys().cloned().collect())
            .unwrap_or_default();
        languages.sort();
        languages
    }

    /// Total number of overlays across all paths
    pub fn len(&self) -> usize {
        self.entries.iter().map(|e| e.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Section, VerificationStatus};

    fn overlay(language: &str, summary: &str) -> Document {
        let mut doc = Document::new("p", summary)
            .with_sections(vec![Section::new("Titre", "Texte").with_code("run()")]);
        doc.language = language.to_string();
        doc
    }

    fn success() -> VerificationRecord {
        VerificationRecord {
            status: VerificationStatus::Success,
            logs: "ok".to_string(),
            fixed_code: None,
        }
    }

    #[test]
    fn test_put_and_get() {
        let cache = OverlayCache::new();
        cache.put("p", "fr", overlay("fr", "Résumé"), VerificationRecord::idle(), 1);

        assert_eq!(cache.get("p", "fr").unwrap().summary, "Résumé");
        assert!(cache.get("p", "de").is_none());
        assert!(cache.get("q", "fr").is_none());
        assert_eq!(cache.entry("p", "fr").unwrap().base_revision, 1);
    }

    #[test]
    fn test_invalidate_path_only_touches_that_path() {
        let cache = OverlayCache::new();
        cache.put("p", "fr", overlay("fr", "a"), VerificationRecord::idle(), 1);
        cache.put("p", "de", overlay("de", "b"), VerificationRecord::idle(), 1);
        cache.put("q", "fr", overlay("fr", "c"), VerificationRecord::idle(), 2);

        assert_eq!(cache.invalidate_path("p"), 2);
        assert!(cache.get("p", "fr").is_none());
        assert!(cache.get("q", "fr").is_some());
        assert_eq!(cache.invalidate_path("p"), 0);
    }

    #[test]
    fn test_refresh_verification_keeps_prose() {
        let cache = OverlayCache::new();
        cache.put("p", "fr", overlay("fr", "Résumé"), VerificationRecord::idle(), 1);
        cache.put("p", "de", overlay("de", "Zusammenfassung"), VerificationRecord::idle(), 1);

        assert_eq!(cache.refresh_verification("p", &success()), 2);

        let fr = cache.entry("p", "fr").unwrap();
        assert_eq!(fr.verification, success());
        assert_eq!(fr.document.summary, "Résumé");
        assert_eq!(fr.document.sections[0].content, "Texte");
        assert_eq!(cache.entry("p", "de").unwrap().verification, success());
        assert_eq!(cache.refresh_verification("missing", &success()), 0);
    }

    #[test]
    fn test_languages_and_len() {
        let cache = OverlayCache::new();
        assert!(cache.is_empty());
        cache.put("p", "fr", overlay("fr", "a"), VerificationRecord::idle(), 1);
        cache.put("p", "de", overlay("de", "b"), VerificationRecord::idle(), 1);

        assert_eq!(cache.languages("p"), vec!["de", "fr"]);
        assert_eq!(cache.len(), 2);
    }
}
