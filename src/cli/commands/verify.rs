//! Verify Command
//!
//! Check a file's documented code examples against its source.
//!
//! Usage:
//!   docsync verify <PATH> [--apply-fix] [--json]

use serde::Serialize;

use crate::cli::ui::{Output, render_document, render_verification, styled_status};
use crate::cli::util::{CommandContext, Overrides, runtime};
use crate::types::{Result, VerificationRecord, VerificationStatus};

#[derive(Debug, Clone, Default)]
pub struct VerifyOptions {
    pub path: String,
    /// Replace the code examples with the suggested fix when verification fails
    pub apply_fix: bool,
    pub json: bool,
    pub quiet: bool,
    pub overrides: Overrides,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyReport {
    pub path: String,
    pub verification: VerificationRecord,
    pub fix_applied: bool,
}

impl VerifyReport {
    /// Failed and not repaired
    pub fn is_failure(&self) -> bool {
        self.verification.status == VerificationStatus::Failed && !self.fix_applied
    }
}

pub fn run(options: VerifyOptions) -> Result<VerifyReport> {
    let ctx = CommandContext::load(&options.overrides)?;
    runtime()?.block_on(verify(&ctx, &options))
}

async fn verify(ctx: &CommandContext, options: &VerifyOptions) -> Result<VerifyReport> {
    let output = Output::quiet(options.quiet || options.json);
    let orchestrator = &ctx.orchestrator;
    let path = options.path.as_str();

    let documented = orchestrator.ensure_documented(path).await?;
    output.info(&format!(
        "{} documented ({} examples)",
        path,
        documented.view.document.code_examples().count()
    ));

    let record = orchestrator.request_verification(path).await?;
    output.key_value("Status", styled_status(record.status));

    let mut fix_applied = false;
    if options.apply_fix && record.status == VerificationStatus::Failed {
        match orchestrator.apply_suggested_fix(path)? {
            Some(view) => {
                fix_applied = true;
                output.success("Applied suggested fix");
                if !options.json && !options.quiet {
                    println!("\n{}", render_document(&view.document));
                }
            }
            None => output.warning("Verification failed without a suggested fix"),
        }
    }

    let report = VerifyReport {
        path: path.to_string(),
        verification: record,
        fix_applied,
    };

    if options.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if !options.quiet {
        println!("\n{}", render_verification(&report.verification));
    }

    Ok(report)
}
