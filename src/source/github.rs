//! GitHub repository source
//!
//! - fingerprint: blob `sha` from the contents API
//! - content: the same endpoint with the raw media type
//! - listing: `git/trees/{branch}?recursive=1`
//!
//! ## Status mapping
//!
//! | Response | Error |
//! |----------|-------|
//! | 404 | `NotFound` |
//! | 401 | `Unauthorized` |
//! | 429, or 403 with `x-ratelimit-remaining: 0` | `RateLimited` |
//! | other 403 | `Unauthorized` |
//! | anything else | `Unavailable` |

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use crate::capability::ContentSource;
use crate::constants::network;
use crate::types::{ContentFetchError, DocError, Fingerprint, Result};

const JSON_MEDIA_TYPE: &str = "application/vnd.github+json";
const RAW_MEDIA_TYPE: &str = "application/vnd.github.raw";
const RATE_LIMIT_REMAINING: &str = "x-ratelimit-remaining";

/// Split `owner/repo` into its parts
pub fn parse_repository(repository: &str) -> Option<(String, String)> {
    let (owner, repo) = repository.trim().split_once('/')?;
    let repo = repo.trim_end_matches(".git");
    if owner.is_empty() || repo.is_empty() || repo.contains('/') {
        return None;
    }
    Some((owner.to_string(), repo.to_string()))
}

pub struct GitHubContentSource {
    owner: String,
    repo: String,
    branch: String,
    token: Option<SecretString>,
    api_base: Url,
    client: reqwest::Client,
}

impl std::fmt::Debug for GitHubContentSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubContentSource")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("branch", &self.branch)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("api_base", &self.api_base.as_str())
            .finish()
    }
}

impl GitHubContentSource {
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        branch: impl Into<String>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(network::USER_AGENT)
            .build()
            .map_err(|e| DocError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            owner: owner.into(),
            repo: repo.into(),
            branch: branch.into(),
            token: None,
            api_base: parse_api_base(network::GITHUB_API_BASE)?,
            client,
        })
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.is_empty()).map(SecretString::from);
        self
    }

    pub fn with_api_base(mut self, api_base: &str) -> Result<Self> {
        self.api_base = parse_api_base(api_base)?;
        Ok(self)
    }

    /// `{api_base}/repos/{owner}/{repo}/{segments...}`
    fn endpoint<'a>(
        &self,
        segments: impl IntoIterator<Item = &'a str>,
    ) -> std::result::Result<Url, ContentFetchError> {
        let mut url = self.api_base.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                ContentFetchError::Unavailable(format!("invalid API base {}", self.api_base))
            })?;
            path.pop_if_empty()
                .extend(["repos", self.owner.as_str(), self.repo.as_str()])
                .extend(segments);
        }
        Ok(url)
    }

    fn contents_url(&self, path: &str) -> std::result::Result<Url, ContentFetchError> {
        let mut url = self.endpoint(
            std::iter::once("contents").chain(path.split('/').filter(|s| !s.is_empty())),
        )?;
        url.query_pairs_mut().append_pair("ref", &self.branch);
        Ok(url)
    }

    async fn get(
        &self,
        url: Url,
        accept: &str,
    ) -> std::result::Result<reqwest::Response, ContentFetchError> {
        let mut request = self.client.get(url.clone()).header(ACCEPT, accept);
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token.expose_secret()));
        }

        let response = request.send().await.map_err(|e| {
            ContentFetchError::Unavailable(format!("GitHub request failed: {}", e))
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let headers = response.headers().clone();
        let body = response.text().await.unwrap_or_default();
        debug!(%status, url = %url, "GitHub request rejected");
        Err(classify_status(
            status,
            &headers,
            &format!("{} ({}): {}", url.path(), status, body.trim()),
        ))
    }
}

fn parse_api_base(api_base: &str) -> Result<Url> {
    Url::parse(api_base)
        .map_err(|e| DocError::Config(format!("Invalid GitHub API base '{}': {}", api_base, e)))
}

/// Map a non-success GitHub response onto a fetch error
pub fn classify_status(status: StatusCode, headers: &HeaderMap, message: &str) -> ContentFetchError {
    let message = message.to_string();
    let exhausted = headers
        .get(RATE_LIMIT_REMAINING)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim() == "0");

    match status {
        StatusCode::NOT_FOUND => ContentFetchError::NotFound(message),
        StatusCode::UNAUTHORIZED => ContentFetchError::Unauthorized(message),
        StatusCode::TOO_MANY_REQUESTS => ContentFetchError::RateLimited(message),
        StatusCode::FORBIDDEN if exhausted => ContentFetchError::RateLimited(message),
        StatusCode::FORBIDDEN => ContentFetchError::Unauthorized(message),
        _ => ContentFetchError::Unavailable(message),
    }
}

#[derive(Debug, Deserialize)]
struct ContentEntry {
    sha: String,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Deserialize)]
struct TreeResponse {
    tree: Vec<TreeEntry>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Debug, Deserialize)]
struct TreeEntry {
    path: String,
    #[serde(rename = "type")]
    kind: String,
}

impl TreeResponse {
    fn blob_paths(self) -> Vec<String> {
        self.tree
            .into_iter()
            .filter(|entry| entry.kind == "blob")
            .map(|entry| entry.path)
            .collect()
    }
}

#[async_trait]
impl ContentSource for GitHubContentSource {
    async fn fetch_fingerprint(
        &self,
        path: &str,
    ) -> std::result::Result<Fingerprint, ContentFetchError> {
        let url = self.contents_url(path)?;
        let response = self.get(url, JSON_MEDIA_TYPE).await?;

        // directories come back as an array and fail to decode here
        let entry: ContentEntry = response.json().await.map_err(|e| {
            ContentFetchError::NotFound(format!("{} is not a file: {}", path, e))
        })?;
        if entry.kind != "file" {
            return Err(ContentFetchError::NotFound(format!(
                "{} is a {}, not a file",
                path, entry.kind
            )));
        }

        Ok(Fingerprint::new(entry.sha))
    }

    async fn fetch_content(&self, path: &str) -> std::result::Result<String, ContentFetchError> {
        let url = self.contents_url(path)?;
        let response = self.get(url, RAW_MEDIA_TYPE).await?;

        response
            .text()
            .await
            .map_err(|e| ContentFetchError::Unavailable(format!("reading {}: {}", path, e)))
    }

    async fn list_files(&self) -> std::result::Result<Vec<String>, ContentFetchError> {
        let mut url = self.endpoint(["git", "trees", self.branch.as_str()])?;
        url.query_pairs_mut().append_pair("recursive", "1");

        let response = self.get(url, JSON_MEDIA_TYPE).await?;
        let tree: TreeResponse = response.json().await.map_err(|e| {
            ContentFetchError::Unavailable(format!("decoding repository tree: {}", e))
        })?;

        if tree.truncated {
            warn!(
                repository = %self.describe(),
                "Repository tree was truncated by GitHub; some files are not listed"
            );
        }

        Ok(tree.blob_paths())
    }

    fn describe(&self) -> String {
        format!("github:{}/{}@{}", self.owner, self.repo, self.branch)
    }
}
