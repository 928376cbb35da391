//! Engine error taxonomy.

use thiserror::Error;

use crate::stores::StoreError;
use recap_llm::SummarizerError;

/// Errors that abort a compaction run.
///
/// Propagation policy: a summarizer failure during the stage-one step
/// aborts that step with nothing purged or inserted; a store failure aborts
/// the run; a cascade-stage failure stops higher stages but leaves
/// committed lower-stage work in place. In every failure case the run
/// marker is left untouched so the next scheduled invocation retries.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The summarizer failed, timed out, or returned an empty result.
    #[error("summarizer failed: {0}")]
    Summarizer(#[from] SummarizerError),

    /// A collaborator store reported an I/O or backend failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The engine configuration is invalid.
    #[error("invalid configuration: {reason}")]
    Configuration {
        /// What was rejected.
        reason: String,
    },

    /// A job name was dispatched that no registered job answers to.
    #[error("unknown job: {name}")]
    UnknownJob {
        /// The unmatched job name.
        name: String,
    },
}

impl EngineError {
    /// Create a configuration error.
    #[must_use]
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }
}
