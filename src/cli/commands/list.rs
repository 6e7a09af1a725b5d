//! List Command
//!
//! Show the documentable files of the configured source.
//!
//! Usage:
//!   docsync list [--json]

use crate::cli::ui::Output;
use crate::cli::util::{CommandContext, Overrides, runtime};
use crate::source::documentable_files;
use crate::types::Result;

pub fn run(overrides: &Overrides, json: bool) -> Result<Vec<String>> {
    let (config, source) = CommandContext::load_source(overrides)?;
    let files = runtime()?.block_on(documentable_files(
        source.as_ref(),
        &config.documentation.extensions,
    ))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&files)?);
        return Ok(files);
    }

    let output = Output::new();
    output.header(&format!(
        "{} documentable file(s) in {}",
        files.len(),
        source.describe()
    ));
    for file in &files {
        println!("  {}", file);
    }
    if files.is_empty() {
        output.warning("No files match documentation.extensions");
    }
    Ok(files)
}
