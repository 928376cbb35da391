//! Prefixed, time-ordered ID generation.

use uuid::Uuid;

/// Generate a prefixed UUID v7 ID (e.g. `sum-0192f3a0-…`).
///
/// v7 IDs sort by creation time, which keeps same-anchor rows in insertion
/// order when used as a secondary sort key.
#[must_use]
pub fn generate_id(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::now_v7())
}
