//! Local working tree source
//!
//! Fingerprint is the lowercase hex SHA-256 of the file bytes. Listing
//! respects `.gitignore` and never follows symlinks.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use ignore::WalkBuilder;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::capability::ContentSource;
use crate::types::{ContentFetchError, Fingerprint};

pub struct LocalContentSource {
    root: PathBuf,
}

impl LocalContentSource {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a relative path under the root; anything escaping it is not found
    fn resolve(&self, path: &str) -> Result<PathBuf, ContentFetchError> {
        let relative = Path::new(path);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));

        if path.is_empty() || escapes {
            return Err(ContentFetchError::NotFound(format!(
                "{} is outside {}",
                path,
                self.root.display()
            )));
        }
        Ok(self.root.join(relative))
    }

    /// Symlinks are followed only while the target stays inside the root
    async fn read(&self, path: &str) -> Result<Vec<u8>, ContentFetchError> {
        let full = self.resolve(path)?;
        let (root, target) = tokio::try_join!(
            tokio::fs::canonicalize(&self.root),
            tokio::fs::canonicalize(&full)
        )
        .map_err(|e| map_io_error(path, e))?;

        if !target.starts_with(&root) {
            return Err(ContentFetchError::NotFound(format!(
                "{} resolves outside {}",
                path,
                self.root.display()
            )));
        }

        tokio::fs::read(&target)
            .await
            .map_err(|e| map_io_error(path, e))
    }
}

fn map_io_error(path: &str, err: std::io::Error) -> ContentFetchError {
    let message = format!("{}: {}", path, err);
    match err.kind() {
        ErrorKind::NotFound => ContentFetchError::NotFound(message),
        ErrorKind::PermissionDenied => ContentFetchError::Unauthorized(message),
        _ => ContentFetchError::Unavailable(message),
    }
}

/// Lowercase hex SHA-256 of `bytes`
pub fn content_hash(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

#[async_trait]
impl ContentSource for LocalContentSource {
    async fn fetch_fingerprint(&self, path: &str) -> Result<Fingerprint, ContentFetchError> {
        let bytes = self.read(path).await?;
        Ok(Fingerprint::new(content_hash(&bytes)))
    }

    async fn fetch_content(&self, path: &str) -> Result<String, ContentFetchError> {
        let bytes = self.read(path).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    async fn list_files(&self) -> Result<Vec<String>, ContentFetchError> {
        let root = self.root.clone();

        let files = tokio::task::spawn_blocking(move || {
            WalkBuilder::new(&root)
                .hidden(true)
                .git_ignore(true)
                .git_global(true)
                .git_exclude(true)
                .require_git(false)
                .follow_links(false)
                .build()
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.file_type().is_some_and(|t| t.is_file()))
                .filter_map(|entry| {
                    entry
                        .path()
                        .strip_prefix(&root)
                        .ok()
                        .map(|p| p.to_string_lossy().replace('\\', "/"))
                })
                .collect::<Vec<_>>()
        })
        .await
        .map_err(|e| ContentFetchError::Unavailable(format!("file walk failed: {}", e)))?;

        debug!(root = %self.root.display(), files = files.len(), "Listed local files");
        Ok(files)
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}
