//! Global Constants
//!
//! Centralized constants for placeholders, limits and tuning.

/// Document defaults and fixed texts
pub mod documents {
    /// Language code of canonical documents
    pub const BASE_LANGUAGE: &str = "en";

    /// Logs attached after a fix replaced the code examples
    pub const FIX_APPLIED_LOG: &str = "Fix applied. Ready for re-verification.";

    /// Logs attached while a verification request is running
    pub const VERIFICATION_PENDING_LOG: &str = "Verification in progress...";
}

/// Resilient parser constants
pub mod parser {
    /// Raw fallback content limit (characters)
    pub const RAW_FALLBACK_LIMIT: usize = 1000;

    /// Marker appended when raw fallback text is truncated
    pub const ELLIPSIS: &str = "...";

    /// Summary used by the strict tier when the object has none
    pub const MISSING_SUMMARY: &str = "No summary provided.";

    /// Summary used by the recovered tier when no summary could be scavenged
    pub const RECOVERED_SUMMARY: &str = "Summary unavailable (recovered from a malformed response).";

    /// Summary of raw fallback documents
    pub const RAW_SUMMARY: &str = "Raw analysis (response could not be parsed).";

    /// Title default for sections without one
    pub const UNTITLED_SECTION: &str = "Untitled Section";

    /// Content default for sections without one
    pub const MISSING_CONTENT: &str = "Content missing";

    /// Title of the single raw fallback section
    pub const RAW_SECTION_TITLE: &str = "Analysis";

    /// Code example of the single raw fallback section
    pub const RAW_CODE_PLACEHOLDER: &str =
        "// Code example unavailable: the response could not be parsed";
}

/// Documentation workflow constants
pub mod workflow {
    /// Source characters included in a generation prompt
    pub const DEFAULT_MAX_FILE_CHARS: usize = 12_000;

    /// Paths documented in parallel by batch runs
    pub const DEFAULT_CONCURRENCY: usize = 4;

    /// Separator between joined code examples sent for verification
    pub const EXAMPLE_SEPARATOR: &str = "\n\n";

    /// Extensions documented by default
    pub const DEFAULT_EXTENSIONS: &[&str] = &[
        "rs", "ts", "tsx", "js", "jsx", "py", "go", "java", "kt", "c", "h", "cpp", "hpp", "cs",
        "rb", "php", "swift", "scala", "sh",
    ];
}

/// Retry constants for LLM providers
pub mod retry {
    /// Default maximum retries per request
    pub const DEFAULT_MAX_RETRIES: usize = 3;

    /// Base delay for exponential backoff (milliseconds)
    pub const BASE_DELAY_MS: u64 = 500;

    /// Maximum delay between retries (seconds)
    pub const MAX_DELAY_SECS: u64 = 30;
}

/// Network constants
pub mod network {
    /// Default LLM request timeout (seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

    /// Default GitHub API base
    pub const GITHUB_API_BASE: &str = "https://api.github.com";

    /// User agent sent to GitHub (required by its API)
    pub const USER_AGENT: &str = concat!("docsync/", env!("CARGO_PKG_VERSION"));
}
