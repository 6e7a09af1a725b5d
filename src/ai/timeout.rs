//! Timeout helper for LLM-backed operations
//!
//! ## Usage
//!
//! ```ignore
//! use crate::ai::timeout::with_timeout;
//!
//! let reply = with_timeout(
//!     Duration::from_secs(300),
//!     async { provider.complete(&prompt).await },
//!     "documentation generation",
//! ).await?;
//! ```

use std::future::Future;
use std::time::Duration;

use crate::types::{DocError, Result};

/// Execute an async operation with a timeout
///
/// Returns `DocError::Timeout` if the operation doesn't complete within the
/// specified duration.
pub async fn with_timeout<T, F>(timeout: Duration, future: F, operation_name: &str) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(result) => result,
        Err(_) => Err(DocError::timeout(operation_name, timeout)),
    }
}
