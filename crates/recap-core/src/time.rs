//! Sortable ISO-8601 timestamp encoding.
//!
//! Buffer messages and summaries are ordered by timestamp in the store, so
//! the persisted form must sort lexicographically: fixed-width RFC 3339
//! with millisecond precision and a `Z` suffix.

use chrono::{DateTime, SecondsFormat, Utc};
use thiserror::Error;

/// A timestamp string that could not be parsed as RFC 3339.
#[derive(Debug, Error)]
#[error("invalid ISO-8601 timestamp {raw:?}: {source}")]
pub struct TimestampParseError {
    /// The rejected input.
    pub raw: String,
    /// Underlying chrono parse failure.
    #[source]
    pub source: chrono::ParseError,
}

/// Encode a timestamp as a fixed-width, lexicographically sortable string.
#[must_use]
pub fn to_sortable(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a timestamp previously encoded with [`to_sortable`].
///
/// Accepts any RFC 3339 offset and normalizes to UTC, so rows written by
/// older ingestion paths remain readable.
pub fn parse_sortable(raw: &str) -> Result<DateTime<Utc>, TimestampParseError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|source| TimestampParseError {
            raw: raw.to_owned(),
            source,
        })
}
