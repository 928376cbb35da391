//! Database schema bootstrap.

/// Schema applied on every open. `IF NOT EXISTS` keeps reopening cheap.
///
/// `buffer_messages.id` is an insertion counter used only as a tiebreaker
/// for identical timestamps; it never leaves this crate. `run_marker` is a
/// single-row table pinned to `id = 0`.
pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS buffer_messages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    sender TEXT NOT NULL,
    content TEXT NOT NULL,
    timestamp TEXT NOT NULL,
    platform TEXT NOT NULL,
    mode TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_buffer_messages_timestamp
    ON buffer_messages(timestamp);

CREATE TABLE IF NOT EXISTS summaries (
    id TEXT PRIMARY KEY,
    content TEXT NOT NULL,
    anchor_timestamp TEXT NOT NULL,
    stage INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_summaries_stage_anchor
    ON summaries(stage, anchor_timestamp);

CREATE TABLE IF NOT EXISTS run_marker (
    id INTEGER PRIMARY KEY CHECK (id = 0),
    last_run_at TEXT NOT NULL
);
";
