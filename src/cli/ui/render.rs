//! Markdown rendering of documents

use std::fmt::Write;

use crate::ai::prompt::code_fence_language;
use crate::orchestrator::DocumentView;
use crate::types::{Document, VerificationRecord, VerificationStatus};

/// Render a document as Markdown, fencing code examples in the file's language
pub fn render_document(document: &Document) -> String {
    let fence = code_fence_language(&document.file_path);
    let mut out = String::new();

    let _ = writeln!(out, "# {}\n", document.file_path);
    let _ = writeln!(out, "{}\n", document.summary.trim());

    for section in &document.sections {
        let _ = writeln!(out, "## {}\n", section.title.trim());
        let _ = writeln!(out, "{}\n", section.content.trim());
        if let Some(code) = section.code() {
            let _ = writeln!(out, "```{}\n{}\n```\n", fence, code.trim_end());
        }
    }

    out.trim_end().to_string() + "\n"
}

/// Render the verification block shown under a document
pub fn render_verification(record: &VerificationRecord) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "**Verification:** {}", record.status);

    if !record.logs.trim().is_empty() {
        let _ = writeln!(out, "\n{}", record.logs.trim());
    }
    if let Some(fixed) = &record.fixed_code
        && record.status == VerificationStatus::Failed
    {
        let _ = writeln!(out, "\nSuggested fix:\n\n```\n{}\n```", fixed.trim_end());
    }
    out
}

/// Full Markdown for one view, with a note when showing the base language
pub fn render_view(view: &DocumentView) -> String {
    let mut out = String::new();
    if view.is_fallback {
        let _ = writeln!(
            out,
            "> No {} translation available; showing {}.\n",
            view.language, view.document.language
        );
    }
    out.push_str(&render_document(&view.document));
    if view.verification.status != VerificationStatus::Idle || !view.verification.logs.is_empty() {
        out.push('\n');
        out.push_str(&render_verification(&view.verification));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{QualityTier, Section};

    fn document() -> Document {
        Document::new("src/math.rs", "Adds numbers").with_sections(vec![
            Section::new("Usage", "Call add").with_code("add(1, 2)"),
            Section::new("Notes", "Pure function"),
        ])
    }

    #[test]
    fn test_render_document() {
        let markdown = render_document(&document());

        assert!(markdown.starts_with("# src/math.rs\n\nAdds numbers\n"));
        assert!(markdown.contains("## Usage\n\nCall add\n\n```rs\nadd(1, 2)\n```"));
        assert!(markdown.contains("## Notes\n\nPure function"));
        assert_eq!(markdown.matches("```").count(), 2);
    }

    #[test]
    fn test_render_view_notes_fallback() {
        let view = DocumentView {
            document: document(),
            verification: VerificationRecord {
                status: VerificationStatus::Failed,
                logs: "wrong arity".to_string(),
                fixed_code: Some("add(1, 2, 3)".to_string()),
            },
            tier: QualityTier::Strict,
            language: "fr".to_string(),
            is_fallback: true,
        };

        let markdown = render_view(&view);
        assert!(markdown.starts_with("> No fr translation available; showing en."));
        assert!(markdown.contains("**Verification:** failed"));
        assert!(markdown.contains("Suggested fix:\n\n```\nadd(1, 2, 3)\n```"));
    }

    #[test]
    fn test_idle_verification_is_omitted() {
        let view = DocumentView {
            document: document(),
            verification: VerificationRecord::idle(),
            tier: QualityTier::Strict,
            language: "en".to_string(),
            is_fallback: false,
        };
        assert!(!render_view(&view).contains("Verification"));
    }
}
