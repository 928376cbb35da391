//! Run debouncer.
//!
//! A time gate over the run marker, not a lock: it suppresses *frequent*
//! re-entry but cannot prevent two overlapping invocations racing before
//! either writes the marker. Deployments that can double-fire need
//! run-level exclusion on top (a single cron entry suffices).

use chrono::{DateTime, Duration, Utc};

/// Whether a run may start now.
///
/// `false` iff `now - last_run < min_interval_seconds`. A marker exactly
/// `min_interval_seconds` old permits the run; a missing marker always
/// does. A marker in the future (clock rollback) gates until real time
/// catches up.
#[must_use]
pub fn should_run(
    last_run: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    min_interval_seconds: i64,
) -> bool {
    match last_run {
        None => true,
        Some(last) => now - last >= Duration::seconds(min_interval_seconds),
    }
}
