//! Strict decoding of verification and translation replies
//!
//! Unlike documentation, these replies never degrade to a guessed result:
//! - no JSON object, even after repair → `ServiceError`
//! - an object with the wrong shape → `MalformedResult`

use serde_json::Value;
use tracing::debug;

use super::json_repair::JsonRepairer;
use crate::types::{
    TranslatedFields, TranslatedSection, TranslationError, VerificationError, VerificationRecord,
    VerificationStatus, json_nonempty_string, json_string,
};

// =============================================================================
// Verification
// =============================================================================

/// Decode an oracle reply into a verification record
pub fn decode_verification(raw: &str) -> Result<VerificationRecord, VerificationError> {
    let (value, repaired) = JsonRepairer::new().parse_object(raw).ok_or_else(|| {
        VerificationError::ServiceError("oracle reply contained no JSON object".to_string())
    })?;
    if repaired {
        debug!("Verification reply needed JSON repair");
    }

    let status = value
        .get("status")
        .and_then(Value::as_str)
        .ok_or_else(|| VerificationError::MalformedResult("missing status".to_string()))?;
    let status = VerificationStatus::parse_verdict(status).ok_or_else(|| {
        VerificationError::MalformedResult(format!("unknown verification status '{}'", status))
    })?;

    Ok(VerificationRecord {
        status,
        logs: json_string(&value, "logs").unwrap_or_default(),
        fixed_code: json_nonempty_string(&value, "fixedCode")
            .or_else(|| json_nonempty_string(&value, "fixed_code")),
    })
}

// =============================================================================
// Translation
// =============================================================================

/// Decode a translator reply into translated prose fields
pub fn decode_translation(raw: &str) -> Result<TranslatedFields, TranslationError> {
    let (value, repaired) = JsonRepairer::new().parse_object(raw).ok_or_else(|| {
        TranslationError::ServiceError("translator reply contained no JSON object".to_string())
    })?;
    if repaired {
        debug!("Translation reply needed JSON repair");
    }

    let summary = json_string(&value, "summary")
        .ok_or_else(|| TranslationError::MalformedResult("missing summary".to_string()))?;
    let items = value
        .get("sections")
        .and_then(Value::as_array)
        .ok_or_else(|| TranslationError::MalformedResult("missing sections array".to_string()))?;

    // Non-object items keep their index so later sections still line up
    let sections = items
        .iter()
        .map(|item| TranslatedSection {
            title: json_nonempty_string(item, "title"),
            content: json_nonempty_string(item, "content"),
        })
        .collect();

    Ok(TranslatedFields { summary, sections })
}
