//! Summarizer trait and error taxonomy.

use async_trait::async_trait;
use thiserror::Error;

/// Result type alias for summarizer operations.
pub type SummarizerResult<T> = Result<T, SummarizerError>;

/// Errors that can occur while producing a summary.
#[derive(Debug, Error)]
pub enum SummarizerError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body could not be decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Endpoint returned a non-success status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error description from the response body.
        message: String,
    },

    /// The call exceeded its bounded timeout.
    #[error("summarizer timed out after {timeout_ms}ms")]
    Timeout {
        /// The configured timeout that elapsed.
        timeout_ms: u64,
    },

    /// The model returned an empty or whitespace-only completion.
    ///
    /// Surfaced as an error rather than an empty string so callers cannot
    /// accidentally purge source data against a blank summary.
    #[error("summarizer returned an empty completion")]
    EmptyCompletion,
}

impl SummarizerError {
    /// Whether retrying the same call could plausibly succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(e) => {
                e.is_timeout()
                    || e.is_connect()
                    || e.status().is_some_and(|s| {
                        s == reqwest::StatusCode::TOO_MANY_REQUESTS || s.is_server_error()
                    })
            }
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            Self::Timeout { .. } => true,
            Self::Json(_) | Self::EmptyCompletion => false,
        }
    }
}

/// Maps an ordered list of texts to one summary string.
///
/// Inputs arrive oldest-first; implementations must preserve that order when
/// assembling the prompt. Calls must be safe to retry: a failed call leaves
/// no state behind.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Condense `texts` into a single summary.
    async fn summarize(&self, texts: &[String]) -> SummarizerResult<String>;
}
