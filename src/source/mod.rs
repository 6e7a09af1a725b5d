//! Content Sources
//!
//! `ContentSource` implementations plus the documentable-file allow-list.

mod github;
mod local;

pub use github::{GitHubContentSource, parse_repository};
pub use local::LocalContentSource;

use std::path::Path;

use crate::capability::ContentSource;
use crate::types::ContentFetchError;

/// Case-insensitive extension match against an allow-list.
///
/// Entries may be written with or without a leading dot.
pub fn is_documentable(path: &str, extensions: &[String]) -> bool {
    let Some(ext) = Path::new(path).extension().and_then(|e| e.to_str()) else {
        return false;
    };

    extensions
        .iter()
        .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(ext))
}

/// List the documentable files of a source, sorted
pub async fn documentable_files(
    source: &dyn ContentSource,
    extensions: &[String],
) -> Result<Vec<String>, ContentFetchError> {
    let mut files: Vec<String> = source
        .list_files()
        .await?
        .into_iter()
        .filter(|path| is_documentable(path, extensions))
        .collect();
    files.sort();
    Ok(files)
}
