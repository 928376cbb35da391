//! Settings types with compiled defaults.
//!
//! All serializable types use `camelCase` for wire compatibility with the
//! settings file.

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SettingsError};

/// Top-level settings for the recap service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecapSettings {
    /// Compaction engine thresholds and cascade layout.
    pub engine: EngineSettings,
    /// Summarizer endpoint configuration.
    pub summarizer: SummarizerSettings,
    /// Persistence configuration.
    pub storage: StorageSettings,
}

impl RecapSettings {
    /// Validate settings that the engine cannot check itself.
    pub fn validate(&self) -> Result<()> {
        if self.summarizer.base_url.trim().is_empty() {
            return Err(SettingsError::invalid("summarizer.baseUrl must not be empty"));
        }
        if self.summarizer.model.trim().is_empty() {
            return Err(SettingsError::invalid("summarizer.model must not be empty"));
        }
        Ok(())
    }
}

/// One step of the meta-summarization cascade.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageTransitionSettings {
    /// Stage whose rows are consumed.
    pub source_stage: u32,
    /// Stage the merged summary is written to.
    pub target_stage: u32,
    /// Minimum source-row count before a merge runs.
    pub trigger_count: usize,
    /// Number of oldest source rows merged per run.
    pub chunk_size: usize,
}

/// Compaction engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineSettings {
    /// Minutes of silence before a buffer counts as Inactive.
    pub idle_threshold_minutes: i64,
    /// Maximum buffer span in minutes to count as dense.
    pub density_threshold_minutes: i64,
    /// Minimum message count within the density window.
    pub density_threshold_lines: usize,
    /// Buffer size at which an Active conversation gets chunk-compacted.
    pub active_trigger_count: usize,
    /// Number of oldest messages summarized per Active chunk.
    pub active_chunk_size: usize,
    /// Minimum seconds between runs (debounce).
    pub min_run_interval_seconds: i64,
    /// Ordered cascade steps, lowest stage first.
    pub stage_transitions: Vec<StageTransitionSettings>,
    /// Maximum rows retained at the terminal stage.
    pub terminal_stage_cap: usize,
    /// Bounded timeout applied around every summarizer call.
    pub summarizer_timeout_seconds: u64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            idle_threshold_minutes: 30,
            density_threshold_minutes: 10,
            density_threshold_lines: 5,
            active_trigger_count: 20,
            active_chunk_size: 10,
            min_run_interval_seconds: 300,
            stage_transitions: vec![
                StageTransitionSettings {
                    source_stage: 1,
                    target_stage: 2,
                    trigger_count: 10,
                    chunk_size: 5,
                },
                StageTransitionSettings {
                    source_stage: 2,
                    target_stage: 3,
                    trigger_count: 10,
                    chunk_size: 5,
                },
            ],
            terminal_stage_cap: 50,
            summarizer_timeout_seconds: 60,
        }
    }
}

/// Summarizer endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SummarizerSettings {
    /// Base URL of an OpenAI-compatible API, without the
    /// `/chat/completions` suffix.
    pub base_url: String,
    /// Model name sent in the request body.
    pub model: String,
    /// Environment variable the API key is read from at startup.
    pub api_key_env: String,
    /// Completion token budget.
    pub max_tokens: u32,
}

impl Default for SummarizerSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".into(),
            model: "gpt-4o-mini".into(),
            api_key_env: "RECAP_API_KEY".into(),
            max_tokens: 512,
        }
    }
}

/// Persistence settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StorageSettings {
    /// Path to the `SQLite` database. Defaults to `~/.recap/recap.db` when
    /// unset (resolved by the runner).
    pub db_path: Option<String>,
}
