//! Settings loading with deep merge and environment variable overrides.
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)
//!
//! Env vars have strict parsing rules: integers must be valid and within
//! range; invalid values are silently ignored (fall back to file/default).

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::errors::Result;
use crate::types::RecapSettings;

/// Resolve the path to the settings file (`~/.recap/settings.json`).
pub fn settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".recap").join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<RecapSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// If the file does not exist, returns defaults. If the file contains
/// invalid JSON, returns an error.
pub fn load_settings_from_path(path: &Path) -> Result<RecapSettings> {
    let defaults = serde_json::to_value(RecapSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    let mut settings: RecapSettings = serde_json::from_value(merged)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Recursive deep merge of two JSON values.
///
/// - Objects are merged recursively (source overrides target per-key)
/// - Arrays and primitives are replaced entirely by source
/// - Null values in source are skipped (preserving target)
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply environment variable overrides to loaded settings.
pub fn apply_env_overrides(settings: &mut RecapSettings) {
    // ── Engine thresholds ───────────────────────────────────────────
    if let Some(v) = read_env_i64("RECAP_IDLE_THRESHOLD_MIN", 1, 10_080) {
        settings.engine.idle_threshold_minutes = v;
    }
    if let Some(v) = read_env_i64("RECAP_DENSITY_THRESHOLD_MIN", 1, 1_440) {
        settings.engine.density_threshold_minutes = v;
    }
    if let Some(v) = read_env_usize("RECAP_DENSITY_THRESHOLD_LINES", 1, 1_000) {
        settings.engine.density_threshold_lines = v;
    }
    if let Some(v) = read_env_usize("RECAP_ACTIVE_TRIGGER_COUNT", 1, 10_000) {
        settings.engine.active_trigger_count = v;
    }
    if let Some(v) = read_env_usize("RECAP_ACTIVE_CHUNK_SIZE", 1, 10_000) {
        settings.engine.active_chunk_size = v;
    }
    if let Some(v) = read_env_i64("RECAP_MIN_RUN_INTERVAL_SECS", 0, 86_400) {
        settings.engine.min_run_interval_seconds = v;
    }
    if let Some(v) = read_env_usize("RECAP_TERMINAL_STAGE_CAP", 1, 100_000) {
        settings.engine.terminal_stage_cap = v;
    }
    if let Some(v) = read_env_u64("RECAP_SUMMARIZER_TIMEOUT_SECS", 1, 3_600) {
        settings.engine.summarizer_timeout_seconds = v;
    }

    // ── Summarizer endpoint ─────────────────────────────────────────
    if let Some(v) = read_env_string("RECAP_SUMMARIZER_URL") {
        settings.summarizer.base_url = v;
    }
    if let Some(v) = read_env_string("RECAP_SUMMARIZER_MODEL") {
        settings.summarizer.model = v;
    }

    // ── Storage ─────────────────────────────────────────────────────
    if let Some(v) = read_env_string("RECAP_DB_PATH") {
        settings.storage.db_path = Some(v);
    }
}

// ── Pure parsing functions (testable without env vars) ──────────────────────

/// Parse a string as an `i64` within a range.
pub fn parse_i64_range(val: &str, min: i64, max: i64) -> Option<i64> {
    let n: i64 = val.parse().ok()?;
    (min..=max).contains(&n).then_some(n)
}

/// Parse a string as a `u64` within a range.
pub fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.parse().ok()?;
    (min..=max).contains(&n).then_some(n)
}

/// Parse a string as a `usize` within a range.
pub fn parse_usize_range(val: &str, min: usize, max: usize) -> Option<usize> {
    let n: usize = val.parse().ok()?;
    (min..=max).contains(&n).then_some(n)
}

fn read_env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn read_env_i64(name: &str, min: i64, max: i64) -> Option<i64> {
    std::env::var(name)
        .ok()
        .and_then(|v| parse_i64_range(&v, min, max))
}

fn read_env_u64(name: &str, min: u64, max: u64) -> Option<u64> {
    std::env::var(name)
        .ok()
        .and_then(|v| parse_u64_range(&v, min, max))
}

fn read_env_usize(name: &str, min: usize, max: usize) -> Option<usize> {
    std::env::var(name)
        .ok()
        .and_then(|v| parse_usize_range(&v, min, max))
}
