//! Collaborator store traits.
//!
//! The engine owns no persistence. It consumes three narrow contracts,
//! injected at construction, so tests run against in-memory fakes and the
//! deployment runs against SQLite (`recap-store`). All operations are
//! synchronous: stores are local and fast; only the summarizer awaits.

use chrono::{DateTime, Utc};
use thiserror::Error;

use recap_core::{BufferMessage, Summary};

/// A store backend failure. Aborts the run; the run marker is left
/// untouched so the next scheduled invocation retries.
#[derive(Debug, Error)]
pub enum StoreError {
    /// I/O or driver error from the backing store.
    #[error("store backend error: {message}")]
    Backend {
        /// Driver-reported description.
        message: String,
    },
}

impl StoreError {
    /// Wrap a driver error. Adapter crates use this instead of a `From`
    /// impl so the engine stays free of driver dependencies.
    #[must_use]
    pub fn backend(err: impl std::fmt::Display) -> Self {
        Self::Backend {
            message: err.to_string(),
        }
    }
}

/// Ordered store of raw, not-yet-summarized messages.
pub trait BufferStore: Send + Sync {
    /// Append one message. Used by ingestion, not by the engine.
    fn append(&self, message: &BufferMessage) -> Result<(), StoreError>;

    /// Read the whole buffer, oldest first.
    fn read_all_ordered(&self) -> Result<Vec<BufferMessage>, StoreError>;

    /// Delete exactly the given messages, matched by full-record equality.
    /// Each batch entry removes at most one stored row, so duplicated
    /// messages survive one-for-one. Runs in one transaction.
    fn delete_exact(&self, subset: &[BufferMessage]) -> Result<(), StoreError>;

    /// Delete the entire buffer.
    fn delete_all(&self) -> Result<(), StoreError>;
}

/// Store of generational summaries.
pub trait SummaryStore: Send + Sync {
    /// Insert a summary, returning the created row.
    fn insert(
        &self,
        content: &str,
        anchor_timestamp: DateTime<Utc>,
        stage: u32,
    ) -> Result<Summary, StoreError>;

    /// Read all summaries at one stage, ordered by `anchor_timestamp`
    /// ascending.
    fn read_all_ordered(&self, stage: u32) -> Result<Vec<Summary>, StoreError>;

    /// Delete summaries by ID in one transaction. Unknown IDs are ignored.
    fn delete_by_ids(&self, ids: &[String]) -> Result<(), StoreError>;
}

/// Single-slot store for the last successful run timestamp.
pub trait RunMarkerStore: Send + Sync {
    /// Read the marker, `None` before the first successful run.
    fn get(&self) -> Result<Option<DateTime<Utc>>, StoreError>;

    /// Overwrite the marker.
    fn set(&self, timestamp: DateTime<Utc>) -> Result<(), StoreError>;
}
