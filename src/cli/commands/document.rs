//! Document Command
//!
//! Generate documentation for files, optionally translated.
//!
//! Usage:
//!   docsync document <PATH>... [--lang fr] [--json]
//!   docsync document --all

use std::collections::HashMap;

use crate::cli::ui::{Output, render_view, styled_tier};
use crate::cli::util::{CommandContext, Overrides, runtime};
use crate::config::is_language_code;
use crate::constants::documents;
use crate::orchestrator::{DocumentView, TranslationStatus};
use crate::types::{DocError, Result};

#[derive(Debug, Clone, Default)]
pub struct DocumentOptions {
    pub paths: Vec<String>,
    /// Document every file matching the extension allow-list
    pub all: bool,
    /// Target language; defaults to `documentation.default_language`
    pub language: Option<String>,
    pub json: bool,
    pub quiet: bool,
    pub overrides: Overrides,
}

/// What happened across all requested paths
#[derive(Debug, Default)]
pub struct DocumentReport {
    pub documented: usize,
    pub generated: usize,
    pub failed: usize,
}

pub fn run(options: DocumentOptions) -> Result<DocumentReport> {
    let ctx = CommandContext::load(&options.overrides)?;
    runtime()?.block_on(document(&ctx, &options))
}

async fn document(ctx: &CommandContext, options: &DocumentOptions) -> Result<DocumentReport> {
    let output = Output::quiet(options.quiet || options.json);
    let orchestrator = &ctx.orchestrator;

    let language = options
        .language
        .clone()
        .unwrap_or_else(|| ctx.config.documentation.default_language.clone())
        .to_ascii_lowercase();
    if !is_language_code(&language) {
        return Err(DocError::Config(format!(
            "Language must be a two-letter code, got '{}'",
            language
        )));
    }

    let paths = if options.all {
        orchestrator.documentable_files(ctx.extensions()).await?
    } else {
        dedup(&options.paths)
    };
    if paths.is_empty() {
        return Err(DocError::Config(
            "No files to document: pass paths or --all".to_string(),
        ));
    }

    output.header(&format!(
        "Documenting {} file(s) from {}",
        paths.len(),
        orchestrator.source().describe()
    ));

    let mut results: HashMap<String, _> = orchestrator
        .document_many(paths.clone(), ctx.config.documentation.concurrency)
        .await
        .into_iter()
        .collect();

    let mut report = DocumentReport::default();
    let mut views = Vec::new();

    for path in &paths {
        let outcome = match results.remove(path) {
            Some(Ok(outcome)) => outcome,
            Some(Err(e)) => {
                report.failed += 1;
                output.error(&format!("{}: {}", path, e));
                continue;
            }
            None => continue,
        };

        report.documented += 1;
        if outcome.generated {
            report.generated += 1;
        }
        if outcome.view.tier.is_degraded() {
            output.warning(&format!(
                "{}: response was malformed, parsed as {}",
                path,
                styled_tier(outcome.view.tier)
            ));
        }

        let view = if language == documents::BASE_LANGUAGE {
            outcome.view
        } else {
            translated_view(ctx, &output, path, &language).await?
        };
        views.push(view);
    }

    if options.json {
        println!("{}", serde_json::to_string_pretty(&views)?);
    } else if !options.quiet {
        for view in &views {
            println!("\n{}", render_view(view));
        }
    }

    output.section("Summary");
    output.key_value("Documented", report.documented);
    output.key_value("Generated", report.generated);
    output.key_value("Failed", report.failed);

    Ok(report)
}

async fn translated_view(
    ctx: &CommandContext,
    output: &Output,
    path: &str,
    language: &str,
) -> Result<DocumentView> {
    let outcome = ctx.orchestrator.request_translation(path, language).await?;
    match &outcome.status {
        TranslationStatus::Fallback(e) => {
            output.warning(&format!("{}: translation failed ({}), showing base document", path, e));
        }
        TranslationStatus::Superseded => {
            output.warning(&format!("{}: document changed during translation", path));
        }
        _ => {}
    }
    Ok(outcome.view)
}

/// Drop repeated paths, keeping first occurrence order
fn dedup(paths: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    paths
        .iter()
        .filter(|path| seen.insert(path.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_keeps_order() {
        let paths = vec![
            "b.rs".to_string(),
            "a.rs".to_string(),
            "b.rs".to_string(),
        ];
        assert_eq!(dedup(&paths), vec!["b.rs", "a.rs"]);
    }
}
