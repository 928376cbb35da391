//! Bounded-timeout wrapper around summarizer calls.

use std::time::Duration;

use recap_llm::{Summarizer, SummarizerError, SummarizerResult};

/// Call the summarizer with an explicit upper bound on wall-clock time.
///
/// The summarizer is the only step in a run that can block on the network.
/// An elapsed timeout is indistinguishable from any other summarizer
/// failure to the caller: the step aborts, nothing is purged or inserted.
pub(crate) async fn summarize_with_timeout(
    summarizer: &dyn Summarizer,
    timeout: Duration,
    texts: &[String],
) -> SummarizerResult<String> {
    match tokio::time::timeout(timeout, summarizer.summarize(texts)).await {
        Ok(result) => result,
        Err(_elapsed) => Err(SummarizerError::Timeout {
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }),
    }
}
