pub mod document;
pub mod error;
pub mod utils;

pub use document::{
    Document, Fingerprint, QualityTier, Section, SectionText, TranslatedFields, TranslatedSection,
    VerificationRecord, VerificationStatus,
};
pub use error::{
    ContentFetchError, DocError, ErrorCategory, ErrorClassifier, GenerationError, LlmError,
    Result, TranslationError, VerificationError,
};
pub use utils::{
    json_nonempty_string, json_string, json_string_or, truncate_chars,
    truncate_for_prompt, unescape_json_fragment,
};
