//! Generational summaries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A summary at some generation stage.
///
/// Stage 1 condenses raw buffer messages; stage N condenses stage-(N-1)
/// summaries. Rows are immutable once created and are removed only when
/// merged into a higher stage or evicted by the terminal-stage retention
/// cap. `anchor_timestamp` is the earliest original timestamp the summary
/// represents and is the sole ordering key for merging and eviction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// Prefixed UUID v7 row ID (`sum-…`).
    pub id: String,
    /// Summary text.
    pub content: String,
    /// Earliest original timestamp represented by this summary.
    pub anchor_timestamp: DateTime<Utc>,
    /// Generation stage, starting at 1.
    pub stage: u32,
}
