//! Resilient LLM Response Parsing
//!
//! Turns arbitrary generator output into a `Document` and never fails.
//!
//! ## Tiers
//!
//! | Tier | Produced when |
//! |------|---------------|
//! | `Strict` | Extracted text parses as a JSON object, possibly after one repair |
//! | `Recovered` | At least one section title could be scavenged |
//! | `RawFallback` | Anything else, wrapped as a single section |
//!
//! Verification and translation replies use `decode_verification` and
//! `decode_translation` instead: those fail with a typed error rather than
//! degrade.

mod fallback;
mod json_repair;
mod response;
mod scavenge;
mod strict;

pub use fallback::raw_document;
pub use json_repair::{JsonRepairer, extract_json_candidate};
pub use response::{decode_translation, decode_verification};
pub use scavenge::scavenge_document;
pub use strict::document_from_value;

use tracing::{debug, warn};

use crate::constants::parser;
use crate::types::{Document, QualityTier};

/// Three-tier documentation parser
#[derive(Debug, Clone)]
pub struct ResilientParser {
    repairer: JsonRepairer,
    raw_fallback_limit: usize,
}

impl Default for ResilientParser {
    fn default() -> Self {
        Self::new(parser::RAW_FALLBACK_LIMIT)
    }
}

impl ResilientParser {
    pub fn new(raw_fallback_limit: usize) -> Self {
        Self {
            repairer: JsonRepairer::new(),
            raw_fallback_limit,
        }
    }

    /// Parse raw generator output. Total: every input yields a document.
    pub fn parse(&self, raw: &str, fallback_name: &str) -> (Document, QualityTier) {
        if let Some(doc) = self
            .repairer
            .parse_or_repair(raw)
            .and_then(|(value, _)| document_from_value(&value, fallback_name))
        {
            return (doc, QualityTier::Strict);
        }

        if let Some(doc) = scavenge_document(raw, fallback_name) {
            debug!(
                file = fallback_name,
                sections = doc.sections.len(),
                "Recovered document from malformed response"
            );
            return (doc, QualityTier::Recovered);
        }

        warn!(
            file = fallback_name,
            "Response could not be parsed, using raw fallback"
        );
        (
            raw_document(raw, fallback_name, self.raw_fallback_limit),
            QualityTier::RawFallback,
        )
    }
}

/// Parse with the default raw fallback limit
pub fn parse_document(raw: &str, fallback_name: &str) -> (Document, QualityTier) {
    ResilientParser::default().parse(raw, fallback_name)
}
