//! Activity classifier.
//!
//! A pure function of `(timestamps, now, thresholds)`. The rules, with
//! exact boundary semantics:
//!
//! 1. If `now - last_ts > idle_threshold`: **Inactive**. Equality at the
//!    threshold still counts as recent.
//! 2. Else if the whole buffer spans at most `density_threshold_minutes`
//!    **and** holds at least `density_threshold_lines` messages: **Active**.
//!    Both edges are inclusive.
//! 3. Else: **Inactive**. Recent but sparse collapses to Inactive; there is
//!    no third state.

use chrono::{DateTime, Duration, Utc};
use recap_core::BufferMessage;

use crate::types::{Activity, EngineConfig};

/// Classify a buffer as Active or Inactive.
///
/// Precondition: `messages` is non-empty and ordered oldest-first. The
/// engine skips classification entirely when the buffer is empty.
#[must_use]
pub fn classify(messages: &[BufferMessage], now: DateTime<Utc>, config: &EngineConfig) -> Activity {
    let (Some(first), Some(last)) = (messages.first(), messages.last()) else {
        return Activity::Inactive;
    };

    if now - last.timestamp > Duration::minutes(config.idle_threshold_minutes) {
        return Activity::Inactive;
    }

    let span = last.timestamp - first.timestamp;
    if span <= Duration::minutes(config.density_threshold_minutes)
        && messages.len() >= config.density_threshold_lines
    {
        Activity::Active
    } else {
        Activity::Inactive
    }
}
