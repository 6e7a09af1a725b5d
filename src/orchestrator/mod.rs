//! Documentation Orchestrator
//!
//! Sequences the capability calls and owns every cache mutation:
//!
//! ```text
//! ensure_documented:    fingerprint → (fresh? done) → content → generate → parse → store
//! request_verification: pending → content → oracle → decode → record
//! request_translation:  (documented?) → prose → translate → decode → overlay
//! apply_fix:            replace code examples → evict overlays
//! ```
//!
//! ## Consistency
//!
//! - Caches change only on confirmed success. Verification publishes
//!   `Pending` while the oracle runs and restores the previous record on
//!   every error exit, including a dropped request future.
//! - Requests are single-flight per key (see `gate`). A waiter re-checks the
//!   cache before doing any work.
//! - Results computed from an older canonical revision are never merged:
//!   generation and verification report `Superseded`, translation stores
//!   nothing.
//! - `view` is a plain read of current cache state, independent of which
//!   requests are in flight.

mod gate;
mod view;

pub use gate::{GateGuard, GateKey, RequestGate};
pub use view::{DocumentView, EnsureOutcome, TranslationOutcome, TranslationStatus};

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{debug, info, instrument, warn};

use crate::ai::{ResilientParser, decode_translation, decode_verification};
use crate::capability::{
    SharedContentSource, SharedGenerator, SharedOracle, SharedTranslator, TranslationRequest,
};
use crate::config::is_language_code;
use crate::constants::{documents, workflow};
use crate::source;
use crate::store::{DocumentStore, OverlayCache, StoreEntry};
use crate::types::{DocError, Fingerprint, Result, VerificationRecord};

pub struct Orchestrator {
    source: SharedContentSource,
    generator: SharedGenerator,
    oracle: SharedOracle,
    translator: SharedTranslator,
    parser: ResilientParser,
    store: Arc<DocumentStore>,
    overlays: Arc<OverlayCache>,
    gate: RequestGate,
}

impl Orchestrator {
    pub fn new(
        source: SharedContentSource,
        generator: SharedGenerator,
        oracle: SharedOracle,
        translator: SharedTranslator,
    ) -> Self {
        Self {
            source,
            generator,
            oracle,
            translator,
            parser: ResilientParser::default(),
            store: Arc::new(DocumentStore::new()),
            overlays: Arc::new(OverlayCache::new()),
            gate: RequestGate::new(),
        }
    }

    pub fn with_parser(mut self, parser: ResilientParser) -> Self {
        self.parser = parser;
        self
    }

    /// Share existing caches instead of starting empty
    pub fn with_caches(mut self, store: Arc<DocumentStore>, overlays: Arc<OverlayCache>) -> Self {
        self.store = store;
        self.overlays = overlays;
        self
    }

    pub fn store(&self) -> &Arc<DocumentStore> {
        &self.store
    }

    pub fn overlays(&self) -> &Arc<OverlayCache> {
        &self.overlays
    }

    pub fn source(&self) -> &SharedContentSource {
        &self.source
    }

    // =========================================================================
    // Display
    // =========================================================================

    /// Current display state for `path` in `language`.
    ///
    /// Returns the overlay if one exists for the current canonical revision,
    /// otherwise the canonical document flagged as fallback. `None` if the
    /// path was never documented.
    pub fn view(&self, path: &str, language: &str) -> Option<DocumentView> {
        let entry = self.store.entry(path)?;
        let language = normalize_language(language);

        if language == entry.document.language {
            return Some(canonical_view(&entry, language, false));
        }

        match self.overlays.entry(path, &language) {
            Some(overlay) if overlay.base_revision == entry.revision => Some(DocumentView {
                document: overlay.document,
                verification: entry.verification.clone(),
                tier: entry.tier,
                language,
                is_fallback: false,
            }),
            _ => Some(canonical_view(&entry, language, true)),
        }
    }

    fn current_view(&self, path: &str, language: &str) -> Result<DocumentView> {
        self.view(path, language).ok_or_else(|| not_documented(path))
    }

    /// Canonical view if the stored document was generated from `fingerprint`
    fn fresh_view(&self, path: &str, fingerprint: &Fingerprint) -> Option<DocumentView> {
        if self.store.is_stale(path, fingerprint) {
            return None;
        }
        self.view(path, documents::BASE_LANGUAGE)
    }

    /// Translated view only if a current overlay exists
    fn overlay_view(&self, path: &str, language: &str) -> Option<DocumentView> {
        self.view(path, language).filter(|view| !view.is_fallback)
    }

    // =========================================================================
    // Generation
    // =========================================================================

    /// Make sure `path` has documentation for its current content.
    ///
    /// Generates at most once per fingerprint: a fresh entry is a cache hit,
    /// and concurrent callers for the same path wait for the first one.
    #[instrument(skip(self, path), fields(path = %path))]
    pub async fn ensure_documented(&self, path: &str) -> Result<EnsureOutcome> {
        let fingerprint = self.source.fetch_fingerprint(path).await?;
        if let Some(view) = self.fresh_view(path, &fingerprint) {
            debug!("Documentation is current");
            return Ok(EnsureOutcome {
                view,
                generated: false,
            });
        }

        let _guard = self.gate.acquire(GateKey::Generate(path.to_string())).await;
        if let Some(view) = self.fresh_view(path, &fingerprint) {
            debug!("Documentation was generated by a concurrent request");
            return Ok(EnsureOutcome {
                view,
                generated: false,
            });
        }

        let started_from = self.store.entry(path).map(|entry| entry.revision);
        let content = self.source.fetch_content(path).await?;
        let raw = self.generator.generate(path, &content).await?;
        let (document, tier) = self.parser.parse(&raw, path);

        let revision = self
            .store
            .upsert_generated_if_revision(path, started_from, fingerprint, document, tier)
            .ok_or_else(|| superseded(path))?;
        let evicted = self.overlays.invalidate_path(path);

        info!(revision, %tier, evicted, "Documented");
        Ok(EnsureOutcome {
            view: self.current_view(path, documents::BASE_LANGUAGE)?,
            generated: true,
        })
    }

    /// Document many paths, at most `concurrency` at a time.
    ///
    /// Results come back in completion order; one failure does not stop the rest.
    #[instrument(skip(self, paths), fields(path_count = paths.len()))]
    pub async fn document_many(
        &self,
        paths: Vec<String>,
        concurrency: usize,
    ) -> Vec<(String, Result<EnsureOutcome>)> {
        let mut stream = stream::iter(paths)
            .map(|path| async move {
                let result = self.ensure_documented(&path).await;
                (path, result)
            })
            .buffer_unordered(concurrency.max(1));

        let mut results = Vec::new();
        while let Some(item) = stream.next().await {
            results.push(item);
        }
        results
    }

    /// Documentable files of the source, sorted
    pub async fn documentable_files(&self, extensions: &[String]) -> Result<Vec<String>> {
        Ok(source::documentable_files(self.source.as_ref(), extensions).await?)
    }

    // =========================================================================
    // Verification
    // =========================================================================

    /// Check the document's code examples against the current source.
    ///
    /// On success the record is stored and copied to every overlay. On any
    /// error the previous record is put back.
    #[instrument(skip(self, path), fields(path = %path))]
    pub async fn request_verification(&self, path: &str) -> Result<VerificationRecord> {
        let _guard = self.gate.acquire(GateKey::Verify(path.to_string())).await;

        let entry = self.store.entry(path).ok_or_else(|| not_documented(path))?;
        if !entry.document.has_code_examples() {
            return Err(DocError::NothingToVerify {
                path: path.to_string(),
            });
        }
        let example = entry
            .document
            .code_examples()
            .collect::<Vec<_>>()
            .join(workflow::EXAMPLE_SEPARATOR);
        let revision = entry.revision;
        let previous = entry.verification.clone();

        self.publish_verification(path, revision, VerificationRecord::pending());
        let pending = PendingVerification {
            orchestrator: self,
            path,
            revision,
            previous: Some(previous),
        };

        match self.run_verification(path, &example).await {
            Ok(record) => {
                pending.disarm();
                if !self.publish_verification(path, revision, record.clone()) {
                    return Err(superseded(path));
                }
                info!(status = %record.status, "Verified");
                Ok(record)
            }
            Err(err) => {
                drop(pending);
                warn!(error = %err, "Verification failed");
                Err(err)
            }
        }
    }

    async fn run_verification(&self, path: &str, example: &str) -> Result<VerificationRecord> {
        let source = self.source.fetch_content(path).await?;
        let raw = self.oracle.verify(path, &source, example).await?;
        Ok(decode_verification(&raw)?)
    }

    /// Store `record` if the entry is still at `revision`, then fan it out
    fn publish_verification(&self, path: &str, revision: u64, record: VerificationRecord) -> bool {
        if !self
            .store
            .set_verification_if_revision(path, revision, record.clone())
        {
            return false;
        }
        let refreshed = self.overlays.refresh_verification(path, &record);
        debug!(path, status = %record.status, refreshed, "Published verification");
        true
    }

    // =========================================================================
    // Fixes
    // =========================================================================

    /// Replace every code example with `fixed_code` and evict all overlays
    #[instrument(skip(self, path, fixed_code), fields(path = %path))]
    pub fn apply_fix(&self, path: &str, fixed_code: &str) -> Result<DocumentView> {
        let revision = self
            .store
            .apply_fix(path, fixed_code)
            .ok_or_else(|| not_documented(path))?;
        let evicted = self.overlays.invalidate_path(path);

        info!(revision, evicted, "Applied fix");
        self.current_view(path, documents::BASE_LANGUAGE)
    }

    /// Apply the fix suggested by the last verification, if there is one
    pub fn apply_suggested_fix(&self, path: &str) -> Result<Option<DocumentView>> {
        let entry = self.store.entry(path).ok_or_else(|| not_documented(path))?;
        match &entry.verification.fixed_code {
            Some(fixed) => self.apply_fix(path, fixed).map(Some),
            None => Ok(None),
        }
    }

    // =========================================================================
    // Translation
    // =========================================================================

    /// Translate the document's prose into `language`.
    ///
    /// Translator failures never surface as `Err`: the outcome carries the
    /// failure and a view of the base document.
    #[instrument(skip(self, path, language), fields(path = %path, language = %language))]
    pub async fn request_translation(
        &self,
        path: &str,
        language: &str,
    ) -> Result<TranslationOutcome> {
        let language = normalize_language(language);
        if !is_language_code(&language) {
            return Err(DocError::UnsupportedLanguage { language });
        }

        if self.store.entry(path).is_none() {
            self.ensure_documented(path).await?;
        }

        if language == documents::BASE_LANGUAGE {
            return Ok(TranslationOutcome {
                view: self.current_view(path, &language)?,
                status: TranslationStatus::BaseLanguage,
            });
        }
        if let Some(view) = self.overlay_view(path, &language) {
            return Ok(cache_hit(view));
        }

        let _guard = self
            .gate
            .acquire(GateKey::Translate(path.to_string(), language.clone()))
            .await;
        if let Some(view) = self.overlay_view(path, &language) {
            return Ok(cache_hit(view));
        }

        let entry = self.store.entry(path).ok_or_else(|| not_documented(path))?;
        let request = TranslationRequest {
            language: language.clone(),
            summary: entry.document.summary.clone(),
            sections: entry.document.prose(),
        };

        let translated = self
            .translator
            .translate(&request)
            .await
            .and_then(|raw| decode_translation(&raw));
        let fields = match translated {
            Ok(fields) => fields,
            Err(err) => {
                warn!(error = %err, "Translation failed, showing base document");
                return Ok(TranslationOutcome {
                    view: self.current_view(path, &language)?,
                    status: TranslationStatus::Fallback(err),
                });
            }
        };

        let overlay = entry.document.overlay(&language, &fields);
        let current = self.store.entry(path).ok_or_else(|| not_documented(path))?;
        if current.revision != entry.revision {
            debug!(
                started = entry.revision,
                current = current.revision,
                "Discarding translation of a superseded revision"
            );
            return Ok(TranslationOutcome {
                view: self.current_view(path, &language)?,
                status: TranslationStatus::Superseded,
            });
        }

        self.overlays.put(
            path,
            &language,
            overlay,
            current.verification.clone(),
            current.revision,
        );
        info!("Translated");
        Ok(TranslationOutcome {
            view: self.current_view(path, &language)?,
            status: TranslationStatus::Translated,
        })
    }
}

/// Puts the previous verification record back when dropped armed.
///
/// Covers error returns and requests whose future is dropped while the
/// oracle runs.
struct PendingVerification<'a> {
    orchestrator: &'a Orchestrator,
    path: &'a str,
    revision: u64,
    previous: Option<VerificationRecord>,
}

impl PendingVerification<'_> {
    fn disarm(mut self) {
        self.previous = None;
    }
}

impl Drop for PendingVerification<'_> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take()
            && self
                .orchestrator
                .publish_verification(self.path, self.revision, previous)
        {
            debug!(path = self.path, "Restored verification record");
        }
    }
}

fn canonical_view(entry: &StoreEntry, language: String, is_fallback: bool) -> DocumentView {
    DocumentView {
        document: entry.document.clone(),
        verification: entry.verification.clone(),
        tier: entry.tier,
        language,
        is_fallback,
    }
}

fn cache_hit(view: DocumentView) -> TranslationOutcome {
    TranslationOutcome {
        view,
        status: TranslationStatus::CacheHit,
    }
}

fn normalize_language(language: &str) -> String {
    language.trim().to_ascii_lowercase()
}

fn not_documented(path: &str) -> DocError {
    DocError::NotDocumented {
        path: path.to_string(),
    }
}

fn superseded(path: &str) -> DocError {
    DocError::Superseded {
        path: path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::sync::Notify;

    use crate::capability::{ContentSource, DocumentationGenerator, Translator, VerificationOracle};
    use crate::types::{
        ContentFetchError, GenerationError, QualityTier, TranslationError, VerificationError,
        VerificationStatus,
    };

    const PATH: &str = "src/math.rs";

    const DOC_REPLY: &str = r#"{"summary":"Adds numbers","sections":[
        {"title":"Usage","content":"Call add","codeExample":"add(1, 2)"},
        {"title":"Notes","content":"Pure function"}]}"#;

    const FR_REPLY: &str = r#"{"summary":"Additionne des nombres","sections":[
        {"title":"Utilisation","content":"Appelez add"},
        {"title":"Remarques","content":"Fonction pure"}]}"#;

    const FAILED_REPLY: &str =
        r#"{"status":"failed","logs":"add takes three arguments","fixedCode":"add(1, 2, 3)"}"#;

    // =========================================================================
    // Fakes
    // =========================================================================

    /// In-memory files; the fingerprint is the content itself
    #[derive(Default)]
    struct MemorySource {
        files: Mutex<HashMap<String, String>>,
    }

    impl MemorySource {
        fn with_file(path: &str, content: &str) -> Self {
            let source = Self::default();
            source.write(path, content);
            source
        }

        fn write(&self, path: &str, content: &str) {
            self.files
                .lock()
                .unwrap()
                .insert(path.to_string(), content.to_string());
        }

        fn read(&self, path: &str) -> std::result::Result<String, ContentFetchError> {
            self.files
                .lock()
                .unwrap()
                .get(path)
                .cloned()
                .ok_or_else(|| ContentFetchError::NotFound(path.to_string()))
        }
    }

    #[async_trait]
    impl ContentSource for MemorySource {
        async fn fetch_fingerprint(
            &self,
            path: &str,
        ) -> std::result::Result<Fingerprint, ContentFetchError> {
            self.read(path).map(Fingerprint::new)
        }

        async fn fetch_content(&self, path: &str) -> std::result::Result<String, ContentFetchError> {
            self.read(path)
        }

        async fn list_files(&self) -> std::result::Result<Vec<String>, ContentFetchError> {
            Ok(self.files.lock().unwrap().keys().cloned().collect())
        }

        fn describe(&self) -> String {
            "memory".to_string()
        }
    }

    struct CountingGenerator {
        reply: Mutex<std::result::Result<String, GenerationError>>,
        calls: AtomicUsize,
        delay: Duration,
    }

    impl CountingGenerator {
        fn new(reply: &str) -> Self {
            Self {
                reply: Mutex::new(Ok(reply.to_string())),
                calls: AtomicUsize::new(0),
                delay: Duration::ZERO,
            }
        }

        fn set_reply(&self, reply: std::result::Result<String, GenerationError>) {
            *self.reply.lock().unwrap() = reply;
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl DocumentationGenerator for CountingGenerator {
        async fn generate(
            &self,
            _file_name: &str,
            _content: &str,
        ) -> std::result::Result<String, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.reply.lock().unwrap().clone()
        }
    }

    /// Oracle that can be held mid-request until the test releases it
    struct ScriptedOracle {
        reply: Mutex<std::result::Result<String, VerificationError>>,
        entered: Notify,
        release: Option<Notify>,
        last_example: Mutex<Option<String>>,
    }

    impl ScriptedOracle {
        fn new(reply: &str) -> Self {
            Self {
                reply: Mutex::new(Ok(reply.to_string())),
                entered: Notify::new(),
                release: None,
                last_example: Mutex::new(None),
            }
        }

        fn held(reply: std::result::Result<String, VerificationError>) -> Self {
            Self {
                reply: Mutex::new(reply),
                entered: Notify::new(),
                release: Some(Notify::new()),
                last_example: Mutex::new(None),
            }
        }

        fn set_reply(&self, reply: std::result::Result<String, VerificationError>) {
            *self.reply.lock().unwrap() = reply;
        }
    }

    #[async_trait]
    impl VerificationOracle for ScriptedOracle {
        async fn verify(
            &self,
            _file_name: &str,
            _source: &str,
            example: &str,
        ) -> std::result::Result<String, VerificationError> {
            *self.last_example.lock().unwrap() = Some(example.to_string());
            self.entered.notify_one();
            if let Some(release) = &self.release {
                release.notified().await;
            }
            self.reply.lock().unwrap().clone()
        }
    }

    struct ScriptedTranslator {
        reply: Mutex<std::result::Result<String, TranslationError>>,
        calls: AtomicUsize,
    }

    impl ScriptedTranslator {
        fn new(reply: std::result::Result<String, TranslationError>) -> Self {
            Self {
                reply: Mutex::new(reply),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Translator for ScriptedTranslator {
        async fn translate(
            &self,
            _request: &TranslationRequest,
        ) -> std::result::Result<String, TranslationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply.lock().unwrap().clone()
        }
    }

    struct Harness {
        orchestrator: Arc<Orchestrator>,
        source: Arc<MemorySource>,
        generator: Arc<CountingGenerator>,
        oracle: Arc<ScriptedOracle>,
        translator: Arc<ScriptedTranslator>,
    }

    fn harness_with(generator: CountingGenerator, oracle: ScriptedOracle) -> Harness {
        let source = Arc::new(MemorySource::with_file(PATH, "fn add(a, b) {}"));
        let generator = Arc::new(generator);
        let oracle = Arc::new(oracle);
        let translator = Arc::new(ScriptedTranslator::new(Ok(FR_REPLY.to_string())));
        let orchestrator = Arc::new(Orchestrator::new(
            source.clone(),
            generator.clone(),
            oracle.clone(),
            translator.clone(),
        ));
        Harness {
            orchestrator,
            source,
            generator,
            oracle,
            translator,
        }
    }

    fn harness() -> Harness {
        harness_with(
            CountingGenerator::new(DOC_REPLY),
            ScriptedOracle::new(FAILED_REPLY),
        )
    }

    // =========================================================================
    // Generation
    // =========================================================================

    #[tokio::test]
    async fn test_ensure_documented_is_idempotent() {
        let h = harness();

        let first = h.orchestrator.ensure_documented(PATH).await.unwrap();
        let second = h.orchestrator.ensure_documented(PATH).await.unwrap();

        assert!(first.generated);
        assert!(!second.generated);
        assert_eq!(h.generator.calls(), 1);
        assert_eq!(second.view.document.summary, "Adds numbers");
        assert_eq!(second.view.document.file_path, PATH);
        assert_eq!(second.view.tier, QualityTier::Strict);
    }

    #[tokio::test]
    async fn test_concurrent_ensure_generates_once() {
        let mut generator = CountingGenerator::new(DOC_REPLY);
        generator.delay = Duration::from_millis(50);
        let h = harness_with(generator, ScriptedOracle::new(FAILED_REPLY));

        let (a, b) = tokio::join!(
            h.orchestrator.ensure_documented(PATH),
            h.orchestrator.ensure_documented(PATH)
        );

        let generated = [a.unwrap().generated, b.unwrap().generated];
        assert_eq!(generated.iter().filter(|g| **g).count(), 1);
        assert_eq!(h.generator.calls(), 1);
    }

    #[tokio::test]
    async fn test_content_change_regenerates_and_evicts_overlays() {
        let h = harness();
        h.orchestrator.request_translation(PATH, "fr").await.unwrap();
        assert_eq!(h.orchestrator.overlays().len(), 1);

        h.source.write(PATH, "fn add(a, b, c) {}");
        let outcome = h.orchestrator.ensure_documented(PATH).await.unwrap();

        assert!(outcome.generated);
        assert_eq!(h.generator.calls(), 2);
        assert!(h.orchestrator.overlays().is_empty());
        assert!(h.orchestrator.view(PATH, "fr").unwrap().is_fallback);
    }

    #[tokio::test]
    async fn test_generation_failure_keeps_previous_entry() {
        let h = harness();
        h.orchestrator.ensure_documented(PATH).await.unwrap();
        let before = h.orchestrator.store().entry(PATH).unwrap();

        h.source.write(PATH, "changed");
        h.generator
            .set_reply(Err(GenerationError::SafetyBlocked("refused".to_string())));
        let err = h.orchestrator.ensure_documented(PATH).await.unwrap_err();

        assert!(matches!(
            err,
            DocError::Generation(GenerationError::SafetyBlocked(_))
        ));
        let after = h.orchestrator.store().entry(PATH).unwrap();
        assert_eq!(after.revision, before.revision);
        assert_eq!(after.document, before.document);
    }

    #[tokio::test]
    async fn test_missing_file_is_a_fetch_error() {
        let h = harness();
        let err = h
            .orchestrator
            .ensure_documented("src/missing.rs")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DocError::ContentFetch(ContentFetchError::NotFound(_))
        ));
        assert!(h.orchestrator.store().is_empty());
        assert_eq!(h.generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_malformed_generation_degrades_instead_of_failing() {
        let h = harness_with(
            CountingGenerator::new("I could not produce JSON, sorry."),
            ScriptedOracle::new(FAILED_REPLY),
        );

        let outcome = h.orchestrator.ensure_documented(PATH).await.unwrap();
        assert_eq!(outcome.view.tier, QualityTier::RawFallback);
        assert_eq!(outcome.view.document.sections.len(), 1);
    }

    #[tokio::test]
    async fn test_document_many() {
        let h = harness();
        h.source.write("src/b.rs", "fn b() {}");

        let mut results = h
            .orchestrator
            .document_many(
                vec![PATH.to_string(), "src/b.rs".to_string(), "src/gone.rs".to_string()],
                2,
            )
            .await;
        results.sort_by(|a, b| a.0.cmp(&b.0));

        assert_eq!(results.len(), 3);
        assert!(results[0].1.is_ok());
        assert!(results[1].1.is_err());
        assert!(results[2].1.is_ok());
        assert_eq!(h.orchestrator.store().paths(), vec!["src/b.rs", PATH]);
    }

    #[tokio::test]
    async fn test_documentable_files() {
        let h = harness();
        h.source.write("README.md", "# readme");

        let files = h
            .orchestrator
            .documentable_files(&["rs".to_string()])
            .await
            .unwrap();
        assert_eq!(files, vec![PATH]);
    }

    // =========================================================================
    // Fixes
    // =========================================================================

    #[tokio::test]
    async fn test_apply_fix_invalidates_overlays() {
        let h = harness();
        h.orchestrator.request_translation(PATH, "fr").await.unwrap();
        h.orchestrator.request_translation(PATH, "de").await.unwrap();

        let view = h.orchestrator.apply_fix(PATH, "new code").unwrap();

        assert!(h.orchestrator.overlays().is_empty());
        assert!(view.document.code_examples().all(|c| c == "new code"));
        assert_eq!(view.verification.status, VerificationStatus::Idle);
        assert_eq!(view.verification.logs, documents::FIX_APPLIED_LOG);
        assert!(h.orchestrator.view(PATH, "fr").unwrap().is_fallback);
    }

    #[tokio::test]
    async fn test_apply_fix_requires_document() {
        let h = harness();
        assert!(matches!(
            h.orchestrator.apply_fix(PATH, "x"),
            Err(DocError::NotDocumented { .. })
        ));
    }

    #[tokio::test]
    async fn test_apply_suggested_fix() {
        let h = harness();
        h.orchestrator.ensure_documented(PATH).await.unwrap();
        assert!(h.orchestrator.apply_suggested_fix(PATH).unwrap().is_none());

        h.orchestrator.request_verification(PATH).await.unwrap();
        let view = h.orchestrator.apply_suggested_fix(PATH).unwrap().unwrap();
        assert!(view.document.code_examples().all(|c| c == "add(1, 2, 3)"));
    }

    // =========================================================================
    // Verification
    // =========================================================================

    #[tokio::test]
    async fn test_verification_fans_out_to_overlays() {
        let h = harness();
        h.orchestrator.request_translation(PATH, "fr").await.unwrap();
        let before = h.orchestrator.overlays().entry(PATH, "fr").unwrap();

        let record = h.orchestrator.request_verification(PATH).await.unwrap();

        assert_eq!(record.status, VerificationStatus::Failed);
        assert_eq!(record.fixed_code.as_deref(), Some("add(1, 2, 3)"));
        let after = h.orchestrator.overlays().entry(PATH, "fr").unwrap();
        assert_eq!(after.verification, record);
        assert_eq!(after.document, before.document);
        assert_eq!(h.orchestrator.view(PATH, "fr").unwrap().verification, record);
        assert_eq!(
            h.oracle.last_example.lock().unwrap().as_deref(),
            Some("add(1, 2)")
        );
    }

    #[tokio::test]
    async fn test_verification_is_pending_then_restored_on_error() {
        let h = harness_with(
            CountingGenerator::new(DOC_REPLY),
            ScriptedOracle::held(Err(VerificationError::ServiceError("down".to_string()))),
        );
        h.orchestrator.request_translation(PATH, "fr").await.unwrap();

        let task = {
            let orchestrator = Arc::clone(&h.orchestrator);
            tokio::spawn(async move { orchestrator.request_verification(PATH).await })
        };

        h.oracle.entered.notified().await;
        let pending = h.orchestrator.view(PATH, "fr").unwrap();
        assert_eq!(pending.verification.status, VerificationStatus::Pending);
        assert_eq!(
            h.orchestrator.overlays().entry(PATH, "fr").unwrap().verification.status,
            VerificationStatus::Pending
        );

        h.oracle.release.as_ref().unwrap().notify_one();
        let err = task.await.unwrap().unwrap_err();

        assert!(matches!(
            err,
            DocError::Verification(VerificationError::ServiceError(_))
        ));
        assert_eq!(
            h.orchestrator.store().get(PATH).unwrap().1,
            VerificationRecord::idle()
        );
        assert_eq!(
            h.orchestrator.overlays().entry(PATH, "fr").unwrap().verification,
            VerificationRecord::idle()
        );
    }

    #[tokio::test]
    async fn test_cancelled_verification_restores_record() {
        let h = harness_with(
            CountingGenerator::new(DOC_REPLY),
            ScriptedOracle::held(Ok(FAILED_REPLY.to_string())),
        );
        h.orchestrator.request_translation(PATH, "fr").await.unwrap();

        let cancelled = tokio::time::timeout(
            Duration::from_millis(20),
            h.orchestrator.request_verification(PATH),
        )
        .await;
        assert!(cancelled.is_err());

        assert_eq!(
            h.orchestrator.store().get(PATH).unwrap().1,
            VerificationRecord::idle()
        );
        assert_eq!(
            h.orchestrator.view(PATH, "fr").unwrap().verification.status,
            VerificationStatus::Idle
        );
        assert_eq!(
            h.orchestrator.overlays().entry(PATH, "fr").unwrap().verification,
            VerificationRecord::idle()
        );
    }

    #[tokio::test]
    async fn test_stale_verification_does_not_overwrite_fix() {
        let h = harness_with(
            CountingGenerator::new(DOC_REPLY),
            ScriptedOracle::held(Ok(FAILED_REPLY.to_string())),
        );
        h.orchestrator.ensure_documented(PATH).await.unwrap();

        let task = {
            let orchestrator = Arc::clone(&h.orchestrator);
            tokio::spawn(async move { orchestrator.request_verification(PATH).await })
        };

        h.oracle.entered.notified().await;
        h.orchestrator.apply_fix(PATH, "user fix").unwrap();
        h.oracle.release.as_ref().unwrap().notify_one();

        let err = task.await.unwrap().unwrap_err();
        assert!(matches!(err, DocError::Superseded { .. }));

        let (document, verification) = h.orchestrator.store().get(PATH).unwrap();
        assert!(document.code_examples().all(|c| c == "user fix"));
        assert_eq!(verification, VerificationRecord::after_fix());
    }

    #[tokio::test]
    async fn test_malformed_verdict_is_not_guessed() {
        let h = harness();
        h.orchestrator.ensure_documented(PATH).await.unwrap();
        h.oracle
            .set_reply(Ok(r#"{"status":"probably fine","logs":""}"#.to_string()));

        let err = h.orchestrator.request_verification(PATH).await.unwrap_err();
        assert!(matches!(
            err,
            DocError::Verification(VerificationError::MalformedResult(_))
        ));
        assert_eq!(
            h.orchestrator.store().get(PATH).unwrap().1.status,
            VerificationStatus::Idle
        );
    }

    #[tokio::test]
    async fn test_verification_preconditions() {
        let h = harness_with(
            CountingGenerator::new(r#"{"summary":"S","sections":[{"title":"T","content":"C"}]}"#),
            ScriptedOracle::new(FAILED_REPLY),
        );

        assert!(matches!(
            h.orchestrator.request_verification(PATH).await,
            Err(DocError::NotDocumented { .. })
        ));

        h.orchestrator.ensure_documented(PATH).await.unwrap();
        assert!(matches!(
            h.orchestrator.request_verification(PATH).await,
            Err(DocError::NothingToVerify { .. })
        ));
    }

    // =========================================================================
    // Translation
    // =========================================================================

    #[tokio::test]
    async fn test_translation_documents_first_and_keeps_code() {
        let h = harness();

        let outcome = h.orchestrator.request_translation(PATH, "FR").await.unwrap();

        assert_eq!(outcome.status, TranslationStatus::Translated);
        assert_eq!(h.generator.calls(), 1);
        let doc = &outcome.view.document;
        assert_eq!(doc.language, "fr");
        assert_eq!(doc.summary, "Additionne des nombres");
        assert_eq!(doc.sections[0].title, "Utilisation");
        assert_eq!(doc.sections[0].code_example.as_deref(), Some("add(1, 2)"));
        assert!(!outcome.view.is_fallback);
    }

    #[tokio::test]
    async fn test_partial_translation_keeps_base_prose() {
        let source = Arc::new(MemorySource::with_file(PATH, "fn add(a, b) {}"));
        let translator = Arc::new(ScriptedTranslator::new(Ok(
            r#"{"summary":"Résumé","sections":[{"title":"Utilisation"}]}"#.to_string(),
        )));
        let orchestrator = Orchestrator::new(
            source,
            Arc::new(CountingGenerator::new(DOC_REPLY)),
            Arc::new(ScriptedOracle::new(FAILED_REPLY)),
            translator,
        );

        let outcome = orchestrator.request_translation(PATH, "fr").await.unwrap();

        assert_eq!(outcome.status, TranslationStatus::Translated);
        let sections = &outcome.view.document.sections;
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].title, "Utilisation");
        assert_eq!(sections[0].content, "Call add");
        assert_eq!(sections[0].code_example.as_deref(), Some("add(1, 2)"));
        assert_eq!(sections[1].title, "Notes");
        assert_eq!(sections[1].content, "Pure function");
    }

    #[tokio::test]
    async fn test_translation_cache_hit() {
        let h = harness();
        h.orchestrator.request_translation(PATH, "fr").await.unwrap();
        let second = h.orchestrator.request_translation(PATH, "fr").await.unwrap();

        assert_eq!(second.status, TranslationStatus::CacheHit);
        assert!(second.status.is_translated());
        assert_eq!(h.translator.calls(), 1);
    }

    #[tokio::test]
    async fn test_base_language_needs_no_translation() {
        let h = harness();
        let outcome = h.orchestrator.request_translation(PATH, "en").await.unwrap();

        assert_eq!(outcome.status, TranslationStatus::BaseLanguage);
        assert_eq!(outcome.view.document.summary, "Adds numbers");
        assert_eq!(h.translator.calls(), 0);
    }

    #[tokio::test]
    async fn test_malformed_language_is_rejected() {
        let h = harness();

        for language in ["", "  ", "french", "f1"] {
            let err = h
                .orchestrator
                .request_translation(PATH, language)
                .await
                .unwrap_err();
            assert!(
                matches!(err, DocError::UnsupportedLanguage { .. }),
                "{:?} should be rejected",
                language
            );
        }

        assert_eq!(h.generator.calls(), 0);
        assert_eq!(h.translator.calls(), 0);
        assert!(h.orchestrator.overlays().is_empty());
    }

    #[tokio::test]
    async fn test_translation_failure_falls_back_to_base() {
        let source = Arc::new(MemorySource::with_file(PATH, "fn add(a, b) {}"));
        let translator = Arc::new(ScriptedTranslator::new(Ok("not json".to_string())));
        let orchestrator = Orchestrator::new(
            source,
            Arc::new(CountingGenerator::new(DOC_REPLY)),
            Arc::new(ScriptedOracle::new(FAILED_REPLY)),
            translator,
        );

        let outcome = orchestrator.request_translation(PATH, "fr").await.unwrap();

        assert!(matches!(
            outcome.status,
            TranslationStatus::Fallback(TranslationError::ServiceError(_))
        ));
        assert!(!outcome.status.is_translated());
        assert!(outcome.view.is_fallback);
        assert_eq!(outcome.view.document.summary, "Adds numbers");
        assert!(orchestrator.overlays().is_empty());
    }

    #[tokio::test]
    async fn test_shared_caches_survive_a_new_orchestrator() {
        let h = harness();
        h.orchestrator.request_translation(PATH, "fr").await.unwrap();

        let generator = Arc::new(CountingGenerator::new(DOC_REPLY));
        let rebuilt = Orchestrator::new(
            h.source.clone(),
            generator.clone(),
            h.oracle.clone(),
            h.translator.clone(),
        )
        .with_caches(
            h.orchestrator.store().clone(),
            h.orchestrator.overlays().clone(),
        );

        let outcome = rebuilt.ensure_documented(PATH).await.unwrap();
        assert!(!outcome.generated);
        assert_eq!(generator.calls(), 0);
        assert!(!rebuilt.view(PATH, "fr").unwrap().is_fallback);
    }

    #[tokio::test]
    async fn test_view_of_unknown_path() {
        let h = harness();
        assert!(h.orchestrator.view(PATH, "en").is_none());
    }
}
