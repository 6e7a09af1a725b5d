//! Canonical document cache
//!
//! One entry per file path: the base-language document, its verification
//! record and the quality tier it was parsed with. Every mutation builds a
//! new entry and swaps it in under the map's shard lock, so readers never
//! observe a half-written entry.
//!
//! ## Revisions
//!
//! Each entry carries a store-wide, strictly increasing `revision`, bumped
//! whenever the document itself changes (regeneration, applied fix).
//! Verification updates keep the revision. In-flight requests remember the
//! revision they started from and use the `*_if_revision` operations so a
//! late reply cannot overwrite newer content.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;

use crate::constants::documents;
use crate::types::{Document, Fingerprint, QualityTier, VerificationRecord};

/// Immutable snapshot of one canonical entry
#[derive(Debug, Clone)]
pub struct StoreEntry {
    pub document: Document,
    pub verification: VerificationRecord,
    pub tier: QualityTier,
    pub revision: u64,
    pub updated_at: DateTime<Utc>,
}

/// Thread-safe cache of canonical documents keyed by file path
#[derive(Default)]
pub struct DocumentStore {
    entries: DashMap<String, Arc<StoreEntry>>,
    next_revision: AtomicU64,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn bump_revision(&self) -> u64 {
        self.next_revision.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Replace the entry for `path` with a freshly generated document.
    ///
    /// Stamps path, fingerprint and base language onto the document and
    /// resets verification to idle. Last writer wins. Returns the new revision.
    pub fn upsert_generated(
        &self,
        path: &str,
        fingerprint: Fingerprint,
        document: Document,
        tier: QualityTier,
    ) -> u64 {
        let entry = self.generated_entry(path, fingerprint, document, tier);
        let revision = entry.revision;
        self.entries.insert(path.to_string(), Arc::new(entry));

        debug!(path, revision, %tier, "Stored generated document");
        revision
    }

    /// Like `upsert_generated`, but only if the entry is still at `expected`
    /// (`None`: no entry may exist yet). Returns `None` when superseded.
    pub fn upsert_generated_if_revision(
        &self,
        path: &str,
        expected: Option<u64>,
        fingerprint: Fingerprint,
        document: Document,
        tier: QualityTier,
    ) -> Option<u64> {
        match self.entries.entry(path.to_string()) {
            Entry::Occupied(mut slot) => {
                if expected != Some(slot.get().revision) {
                    debug!(path, current = slot.get().revision, "Discarding superseded generation");
                    return None;
                }
                let entry = self.generated_entry(path, fingerprint, document, tier);
                let revision = entry.revision;
                slot.insert(Arc::new(entry));
                debug!(path, revision, %tier, "Replaced generated document");
                Some(revision)
            }
            Entry::Vacant(slot) => {
                if expected.is_some() {
                    debug!(path, "Discarding generation for a removed entry");
                    return None;
                }
                let entry = self.generated_entry(path, fingerprint, document, tier);
                let revision = entry.revision;
                slot.insert(Arc::new(entry));
                debug!(path, revision, %tier, "Stored generated document");
                Some(revision)
            }
        }
    }

    fn generated_entry(
        &self,
        path: &str,
        fingerprint: Fingerprint,
        mut document: Document,
        tier: QualityTier,
    ) -> StoreEntry {
        document.file_path = path.to_string();
        document.source_fingerprint = fingerprint;
        document.language = documents::BASE_LANGUAGE.to_string();

        StoreEntry {
            document,
            verification: VerificationRecord::idle(),
            tier,
            revision: self.bump_revision(),
            updated_at: Utc::now(),
        }
    }

    pub fn get(&self, path: &str) -> Option<(Document, VerificationRecord)> {
        self.entries
            .get(path)
            .map(|e| (e.document.clone(), e.verification.clone()))
    }

    /// Snapshot of the whole entry
    pub fn entry(&self, path: &str) -> Option<Arc<StoreEntry>> {
        self.entries.get(path).map(|e| Arc::clone(e.value()))
    }

    /// True if there is no entry or it was generated from other content
    pub fn is_stale(&self, path: &str, current: &Fingerprint) -> bool {
        self.entries
            .get(path)
            .is_none_or(|e| &e.document.source_fingerprint != current)
    }

    /// Replace the verification record. No-op (returns false) if undocumented.
    pub fn set_verification(&self, path: &str, record: VerificationRecord) -> bool {
        self.replace_with(path, None, |entry| entry.verification = record)
    }

    /// Replace the verification record only if the entry is still at `revision`
    pub fn set_verification_if_revision(
        &self,
        path: &str,
        revision: u64,
        record: VerificationRecord,
    ) -> bool {
        self.replace_with(path, Some(revision), |entry| entry.verification = record)
    }

    /// Replace every non-empty code example with `fixed_code` and reset
    /// verification. Returns the new revision, or `None` if undocumented.
    ///
    /// Overlays for the path must be invalidated by the caller.
    pub fn apply_fix(&self, path: &str, fixed_code: &str) -> Option<u64> {
        let mut slot = self.entries.get_mut(path)?;

        let mut next = StoreEntry::clone(&slot);
        let mut replaced = 0usize;
        for section in &mut next.document.sections {
            if section.code().is_some() {
                section.code_example = Some(fixed_code.to_string());
                replaced += 1;
            }
        }
        next.verification = VerificationRecord::after_fix();
        next.revision = self.bump_revision();
        next.updated_at = Utc::now();

        let revision = next.revision;
        *slot = Arc::new(next);

        debug!(path, revision, replaced, "Applied fix to code examples");
        Some(revision)
    }

    /// Swap in a modified copy of the entry, optionally guarded by revision
    fn replace_with(
        &self,
        path: &str,
        expected_revision: Option<u64>,
        update: impl FnOnce(&mut StoreEntry),
    ) -> bool {
        let Some(mut slot) = self.entries.get_mut(path) else {
            return false;
        };
        if expected_revision.is_some_and(|rev| rev != slot.revision) {
            debug!(path, current = slot.revision, "Discarding update for superseded revision");
            return false;
        }

        let mut next = StoreEntry::clone(&slot);
        update(&mut next);
        next.updated_at = Utc::now();
        *slot = Arc::new(next);
        true
    }

    /// Documented paths, sorted
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.entries.iter().map(|e| e.key().clone()).collect();
        paths.sort();
        paths
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
